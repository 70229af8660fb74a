//! Security headers middleware.
//!
//! Adds the baseline browser protections to every response. The API serves
//! JSON only, so there is no CSP to manage here.

use axum::{
    extract::Request,
    http::{
        HeaderValue,
        header::{REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS, X_XSS_PROTECTION},
    },
    middleware::Next,
    response::Response,
};

/// Add security headers to all responses.
///
/// Headers applied:
/// - `X-Frame-Options: DENY` - Prevent clickjacking
/// - `X-Content-Type-Options: nosniff` - Prevent MIME sniffing
/// - `X-XSS-Protection: 1; mode=block` - Legacy XSS filter for older browsers
/// - `Referrer-Policy: strict-origin-when-cross-origin` - Trim referrer leakage
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    // Prevent clickjacking
    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));

    // Prevent MIME sniffing
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));

    // Legacy XSS filter, still honored by older browsers
    headers.insert(X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block"));

    // Trim referrer leakage across origins
    headers.insert(
        REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    response
}
