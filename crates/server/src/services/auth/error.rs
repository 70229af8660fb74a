//! Authentication failures, with the messages clients see.

use cafe_wifi_core::types::EmailError;
use thiserror::Error;

use super::token::TokenError;
use crate::db::RepositoryError;

/// Everything the auth flows can reject a request with.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    InvalidEmail(#[from] EmailError),
    #[error("{0}")]
    WeakPassword(&'static str),
    #[error("An account with this email already exists")]
    UserAlreadyExists,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Access token required")]
    MissingToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Invalid token - user not found")]
    UserNotFound,
    #[error("Account is deactivated")]
    AccountDeactivated,
    #[error("Invalid token type")]
    WrongTokenKind,
    #[error("Current password is incorrect")]
    IncorrectPassword,
    #[error("New password must be different from current password")]
    SamePassword,
    #[error("Email already taken by another user")]
    EmailTaken,
    #[error("failed to hash password")]
    PasswordHash,
    #[error("failed to sign token")]
    TokenSigning,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<TokenError> for AuthError {
    fn from(error: TokenError) -> Self {
        match error {
            TokenError::Expired => Self::TokenExpired,
            TokenError::Invalid => Self::InvalidToken,
            TokenError::Signing => Self::TokenSigning,
        }
    }
}
