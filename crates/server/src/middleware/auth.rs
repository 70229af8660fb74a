//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring user or admin authentication in route
//! handlers. Each extractor also charges the caller's IP against the
//! matching rate-limit scope, so protected handlers get limiting for free.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::client_ip::client_ip;
use crate::config::admin_level;
use crate::error::{AppError, set_sentry_user};
use crate::models::User;
use crate::services::AuthService;
use crate::services::auth::AuthError;
use crate::services::rate_limit::{ADMIN_QUOTA, AUTH_QUOTA};
use crate::state::AppState;

/// The HTTP header name carrying the admin shared key.
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
}

/// Extractor that requires a valid access token.
///
/// Rejects with 401 when the token is missing, invalid, expired, or belongs
/// to a deactivated account, and with 429 when the caller's IP exhausts the
/// authenticated quota.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub User);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ip = client_ip(&parts.headers);
        let decision = state.limiter().check(&format!("auth:{ip}"), AUTH_QUOTA).await;
        if !decision.allowed {
            return Err(AppError::RateLimited {
                retry_after_secs: decision.retry_after_secs(),
            });
        }

        let token = bearer_token(parts).ok_or(AuthError::MissingToken)?;
        let auth = AuthService::new(state.pool(), state.tokens());
        let user = auth.authenticate(token).await?;

        set_sentry_user(&user);
        Ok(Self(user))
    }
}

/// Extractor that optionally resolves the current user.
///
/// Unlike `RequireAuth`, this never rejects: a missing or invalid token
/// simply yields `None`, and no rate-limit quota is charged.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(
///     OptionalAuth(user): OptionalAuth,
/// ) -> impl IntoResponse {
///     match user {
///         Some(u) => format!("Hello, {}!", u.email),
///         None => "Hello, guest!".to_string(),
///     }
/// }
/// ```
pub struct OptionalAuth(pub Option<User>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            return Ok(Self(None));
        };

        let auth = AuthService::new(state.pool(), state.tokens());
        let user = auth.authenticate(token).await.ok();
        if let Some(ref user) = user {
            set_sentry_user(user);
        }
        Ok(Self(user))
    }
}

/// Extractor that requires the admin shared key in `x-admin-key`.
///
/// Admin attempts burn the small `admin:` quota whether or not the key is
/// right, so brute-forcing the key locks the IP out quickly.
pub struct RequireAdmin {
    /// Granted level: `super` for the built-in super key, else `standard`.
    pub level: &'static str,
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ip = client_ip(&parts.headers);
        let decision = state
            .limiter()
            .check(&format!("admin:{ip}"), ADMIN_QUOTA)
            .await;
        if !decision.allowed {
            return Err(AppError::RateLimited {
                retry_after_secs: decision.retry_after_secs(),
            });
        }

        let key = parts
            .headers
            .get(ADMIN_KEY_HEADER)
            .and_then(|h| h.to_str().ok())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Admin key required".to_string()))?;

        if !state.config().is_admin_key(key) {
            tracing::warn!(%ip, "rejected admin key");
            return Err(AppError::Forbidden("Invalid admin key".to_string()));
        }

        Ok(Self {
            level: admin_level(key),
        })
    }
}
