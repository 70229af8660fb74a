//! Admin key verification.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::{AppError, Result};
use crate::middleware::auth::ADMIN_KEY_HEADER;
use crate::middleware::client_ip;
use crate::services::auth::AuthError;
use crate::services::rate_limit::ADMIN_QUOTA;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyBody {
    admin_key: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    is_admin: bool,
    admin_level: &'static str,
    token: String,
}

/// `POST /api/admin/verify` - check the shared admin key and issue a signed
/// admin token for subsequent requests.
///
/// The key is read from the `x-admin-key` header, falling back to an
/// `adminKey` field in the JSON body. Verification attempts are tightly
/// rate limited per IP; failures report how many attempts remain in the
/// window.
pub async fn verify(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<VerifyBody>>,
) -> Result<Json<VerifyResponse>> {
    let ip = client_ip(&headers);
    let decision = state
        .limiter()
        .check(&format!("admin:{ip}"), ADMIN_QUOTA)
        .await;
    if !decision.allowed {
        return Err(AppError::RateLimited {
            retry_after_secs: decision.retry_after_secs(),
        });
    }

    let body = body.map(|Json(body)| body).unwrap_or_default();
    let key = headers
        .get(ADMIN_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|key| !key.is_empty())
        .or_else(|| body.admin_key.as_deref().filter(|key| !key.is_empty()))
        .ok_or_else(|| AppError::BadRequest("Admin key is required".to_string()))?;

    if !state.config().is_admin_key(key) {
        tracing::warn!(%ip, "failed admin verification");
        return Err(AppError::InvalidAdminKey {
            attempts_remaining: decision.remaining,
        });
    }

    let admin_level = config::admin_level(key);
    let token = state
        .tokens()
        .issue_admin(admin_level)
        .map_err(AuthError::from)?;

    tracing::info!(%ip, admin_level, "admin key verified");
    Ok(Json(VerifyResponse {
        is_admin: true,
        admin_level,
        token,
    }))
}
