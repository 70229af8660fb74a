//! Account signup, login, token verification, and password management.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::{Argon2, PasswordHash, PasswordVerifier};
use cafe_wifi_core::types::{Email, TokenKind, UserId};
use chrono::Utc;
use sqlx::PgPool;

use crate::db::{RepositoryError, UserRepository};
use crate::models::User;

pub mod error;
pub mod token;

pub use error::AuthError;
pub use token::{Claims, TokenError, TokenSigner};

const MIN_PASSWORD_LENGTH: usize = 8;

/// Hash a password with Argon2id and a fresh salt.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Check a password against a stored hash. Malformed hashes verify as false.
#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Enforce the password policy: at least 8 characters with an uppercase
/// letter, a lowercase letter, and a digit.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` with the client-facing message.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(
            "Password must be at least 8 characters long",
        ));
    }
    let has_upper = password.chars().any(char::is_uppercase);
    let has_lower = password.chars().any(char::is_lowercase);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_upper && has_lower && has_digit) {
        return Err(AuthError::WeakPassword(
            "Password must contain at least one uppercase letter, one lowercase letter, and one number",
        ));
    }
    Ok(())
}

/// Auth flows over the user repository and token signer.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: &'a TokenSigner,
}

impl<'a> AuthService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a TokenSigner) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens,
        }
    }

    /// Register a new account and sign its first access token.
    ///
    /// # Errors
    ///
    /// Rejects weak passwords, malformed emails, and addresses that already
    /// have an account.
    pub async fn signup(&self, email: &str, password: &str) -> Result<(User, String), AuthError> {
        validate_password(password)?;
        let email = Email::parse(email)?;

        if self.users.get_by_email(&email).await?.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = hash_password(password)?;
        let user = self
            .users
            .create(&email, &password_hash)
            .await
            .map_err(|e| match e {
                // Lost the race against a concurrent signup for the same address
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        let token = self.tokens.issue(user.id, TokenKind::Access)?;
        Ok((user, token))
    }

    /// Verify credentials and sign an access token.
    ///
    /// Unknown addresses and wrong passwords fail identically so the
    /// response does not reveal whether an account exists.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` or `AccountDeactivated`.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let Some((mut user, password_hash)) = self.users.get_by_email_with_hash(&email).await?
        else {
            return Err(AuthError::InvalidCredentials);
        };
        if !verify_password(password, &password_hash) {
            return Err(AuthError::InvalidCredentials);
        }
        if !user.is_active {
            return Err(AuthError::AccountDeactivated);
        }

        self.users.touch_last_login(user.id).await?;
        user.last_login = Some(Utc::now());

        let token = self.tokens.issue(user.id, TokenKind::Access)?;
        Ok((user, token))
    }

    /// Resolve an access token to its active user.
    ///
    /// # Errors
    ///
    /// Rejects expired, malformed, and refresh-kind tokens, tokens for
    /// deleted users, and deactivated accounts.
    pub async fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.tokens.verify(token)?;
        if claims.kind != TokenKind::Access {
            return Err(AuthError::InvalidToken);
        }
        let user_id: UserId = claims.sub.parse().map_err(|_| AuthError::InvalidToken)?;

        let Some(user) = self.users.get_by_id(user_id).await? else {
            return Err(AuthError::UserNotFound);
        };
        if !user.is_active {
            return Err(AuthError::AccountDeactivated);
        }
        Ok(user)
    }

    /// Exchange a refresh token for a fresh access and refresh pair.
    ///
    /// # Errors
    ///
    /// Returns `WrongTokenKind` when handed an access token, otherwise the
    /// same failures as [`Self::authenticate`].
    pub async fn refresh(
        &self,
        refresh_token: &str,
    ) -> Result<(User, String, String), AuthError> {
        let claims = self.tokens.verify(refresh_token)?;
        if claims.kind != TokenKind::Refresh {
            return Err(AuthError::WrongTokenKind);
        }
        let user_id: UserId = claims.sub.parse().map_err(|_| AuthError::InvalidToken)?;

        let Some(user) = self.users.get_by_id(user_id).await? else {
            return Err(AuthError::UserNotFound);
        };
        if !user.is_active {
            return Err(AuthError::AccountDeactivated);
        }

        let access = self.tokens.issue(user.id, TokenKind::Access)?;
        let refresh = self.tokens.issue(user.id, TokenKind::Refresh)?;
        Ok((user, access, refresh))
    }

    /// Change a password after re-verifying the current one.
    ///
    /// # Errors
    ///
    /// Returns `IncorrectPassword`, `SamePassword`, or a policy violation.
    pub async fn change_password(
        &self,
        user_id: UserId,
        current: &str,
        new: &str,
    ) -> Result<(), AuthError> {
        let Some(stored) = self.users.get_password_hash(user_id).await? else {
            return Err(AuthError::UserNotFound);
        };
        if !verify_password(current, &stored) {
            return Err(AuthError::IncorrectPassword);
        }
        if current == new {
            return Err(AuthError::SamePassword);
        }
        validate_password(new)?;

        let password_hash = hash_password(new)?;
        self.users.update_password(user_id, &password_hash).await?;
        Ok(())
    }

    /// Delete an account after verifying its password.
    ///
    /// # Errors
    ///
    /// Returns `IncorrectPassword` or `UserNotFound`.
    pub async fn delete_account(&self, user_id: UserId, password: &str) -> Result<(), AuthError> {
        let Some(stored) = self.users.get_password_hash(user_id).await? else {
            return Err(AuthError::UserNotFound);
        };
        if !verify_password(password, &stored) {
            return Err(AuthError::IncorrectPassword);
        }
        if !self.users.delete(user_id).await? {
            return Err(AuthError::UserNotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_round_trip() {
        let hash = hash_password("Sl0wWifi!").unwrap();
        assert!(verify_password("Sl0wWifi!", &hash));
        assert!(!verify_password("Sl0wWifi?", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("Sl0wWifi!").unwrap();
        let second = hash_password("Sl0wWifi!").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(!verify_password("Sl0wWifi!", "not-a-phc-string"));
    }

    #[test]
    fn test_password_policy_length() {
        let err = validate_password("Ab1").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Password must be at least 8 characters long"
        );
    }

    #[test]
    fn test_password_policy_character_classes() {
        for weak in ["alllowercase1", "ALLUPPERCASE1", "NoDigitsHere"] {
            let err = validate_password(weak).unwrap_err();
            assert_eq!(
                err.to_string(),
                "Password must contain at least one uppercase letter, one lowercase letter, and one number"
            );
        }
    }

    #[test]
    fn test_password_policy_accepts_strong() {
        assert!(validate_password("CorrectHorse1").is_ok());
    }
}
