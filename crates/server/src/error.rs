//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`; the response body is always `{"error": message}`,
//! with `retryAfter` / `attemptsRemaining` added where the contract calls
//! for them.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cafe_wifi_core::types::IdParseError;
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::User;
use crate::services::auth::AuthError;
use crate::validation::ValidationError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Request payload failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A path or body ID was not a valid UUID.
    #[error("{0}")]
    InvalidId(#[from] IdParseError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// State conflict, such as a duplicate resource.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Wrong admin key, with the attempts left before the limiter bites.
    #[error("Invalid admin credentials")]
    InvalidAdminKey { attempts_remaining: u32 },

    /// Fixed-window quota exhausted.
    #[error("Too many requests, please try again later.")]
    RateLimited { retry_after_secs: i64 },

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Wire shape of every error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(rename = "retryAfter", skip_serializing_if = "Option::is_none")]
    retry_after: Option<i64>,
    #[serde(rename = "attemptsRemaining", skip_serializing_if = "Option::is_none")]
    attempts_remaining: Option<u32>,
}

const fn repository_status(error: &RepositoryError) -> StatusCode {
    match error {
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Conflict(_) => StatusCode::CONFLICT,
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Auth(err) => match err {
                AuthError::InvalidEmail(_)
                | AuthError::WeakPassword(_)
                | AuthError::SamePassword => StatusCode::BAD_REQUEST,
                AuthError::UserAlreadyExists | AuthError::EmailTaken => StatusCode::CONFLICT,
                AuthError::WrongTokenKind => StatusCode::FORBIDDEN,
                AuthError::InvalidCredentials
                | AuthError::MissingToken
                | AuthError::TokenExpired
                | AuthError::InvalidToken
                | AuthError::UserNotFound
                | AuthError::AccountDeactivated
                | AuthError::IncorrectPassword => StatusCode::UNAUTHORIZED,
                AuthError::Repository(inner) => repository_status(inner),
                AuthError::PasswordHash | AuthError::TokenSigning => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Validation(_) | Self::InvalidId(_) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) | Self::InvalidAdminKey { .. } => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Database(err) => repository_status(err),
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message the client sees. Server errors stay opaque.
    fn client_message(&self) -> String {
        match self {
            Self::Auth(err) => match err {
                AuthError::PasswordHash | AuthError::TokenSigning => {
                    "Internal server error".to_string()
                }
                AuthError::Repository(inner) => repository_message(inner),
                other => other.to_string(),
            },
            Self::Validation(err) => err.to_string(),
            Self::InvalidId(err) => err.to_string(),
            Self::NotFound(msg)
            | Self::BadRequest(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::Conflict(msg) => msg.clone(),
            Self::InvalidAdminKey { .. } => "Invalid admin credentials".to_string(),
            Self::RateLimited { .. } => "Too many requests, please try again later.".to_string(),
            Self::Database(err) => repository_message(err),
            Self::Internal(_) => "Internal server error".to_string(),
        }
    }
}

fn repository_message(error: &RepositoryError) -> String {
    match error {
        RepositoryError::NotFound => "Not found".to_string(),
        RepositoryError::Conflict(msg) => msg.clone(),
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            "Internal server error".to_string()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = ErrorBody {
            error: self.client_message(),
            retry_after: match self {
                Self::RateLimited { retry_after_secs } => Some(retry_after_secs),
                _ => None,
            },
            attempts_remaining: match self {
                Self::InvalidAdminKey { attempts_remaining } => Some(attempts_remaining),
                _ => None,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from an authenticated user.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user: &User) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user.id.to_string()),
            email: Some(user.email.as_str().to_string()),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_basic_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("Cafe not found".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Unauthorized("Admin key required".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("Invalid admin key".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Conflict("duplicate".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::RateLimited {
                retry_after_secs: 30
            }),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(AppError::Internal("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_status_codes() {
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::UserAlreadyExists)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::WrongTokenKind)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::SamePassword)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::PasswordHash)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repository_errors_map_through() {
        assert_eq!(
            get_status(AppError::Database(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::Conflict(
                "taken".to_string()
            ))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::DataCorruption(
                "bad row".to_string()
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        // Repository failures inside auth flows keep their status
        assert_eq!(
            get_status(AppError::Auth(AuthError::Repository(
                RepositoryError::NotFound
            ))),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_invalid_id_is_bad_request() {
        let err: AppError = "not-a-uuid"
            .parse::<cafe_wifi_core::types::CafeId>()
            .unwrap_err()
            .into();
        assert_eq!(err.client_message(), "invalid cafe ID format");
        assert_eq!(get_status(err), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_rate_limited_body_carries_retry_after() {
        let response = AppError::RateLimited {
            retry_after_secs: 42,
        }
        .into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(
            value.get("error").unwrap(),
            "Too many requests, please try again later."
        );
        assert_eq!(value.get("retryAfter").unwrap(), 42);
    }

    #[tokio::test]
    async fn test_admin_key_body_carries_attempts_remaining() {
        let response = AppError::InvalidAdminKey {
            attempts_remaining: 3,
        }
        .into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value.get("error").unwrap(), "Invalid admin credentials");
        assert_eq!(value.get("attemptsRemaining").unwrap(), 3);
    }

    #[tokio::test]
    async fn test_internal_details_stay_opaque() {
        let response = AppError::Internal("connection pool exhausted".to_string()).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value.get("error").unwrap(), "Internal server error");
    }
}
