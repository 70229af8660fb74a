//! HTTP middleware stack for the API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors, transactions)
//! 2. CORS (configured browser origins)
//! 3. `TraceLayer` (request tracing)
//! 4. Request ID (add unique ID to each request)
//! 5. Security headers
//!
//! Authentication and rate limiting run per route through the extractors
//! in [`auth`], not as router layers.

pub mod auth;
pub mod client_ip;
pub mod request_id;
pub mod security_headers;

pub use auth::{OptionalAuth, RequireAdmin, RequireAuth};
pub use client_ip::client_ip;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
