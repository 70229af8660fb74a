//! Database operations for user accounts.

use cafe_wifi_core::types::{CafeId, Email, Theme, UserId};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::RepositoryError;
use crate::models::{User, UserPreferences};

const USER_COLUMNS: &str = "id, email, first_name, last_name, bio, location, \
    is_active, last_login, pref_notifications, pref_theme, favorites, \
    created_at, updated_at";

/// Raw user row. Email and theme are re-validated on the way out so a
/// corrupted row surfaces as an error instead of bad data.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    bio: Option<String>,
    location: Option<String>,
    is_active: bool,
    last_login: Option<DateTime<Utc>>,
    pref_notifications: bool,
    pref_theme: String,
    favorites: Vec<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email)
            .map_err(|e| RepositoryError::DataCorruption(format!("user {}: {e}", row.id)))?;
        let theme = row
            .pref_theme
            .parse::<Theme>()
            .map_err(|e| RepositoryError::DataCorruption(format!("user {}: {e}", row.id)))?;

        Ok(Self {
            id: row.id,
            email,
            first_name: row.first_name,
            last_name: row.last_name,
            bio: row.bio,
            location: row.location,
            is_active: row.is_active,
            last_login: row.last_login,
            preferences: UserPreferences {
                notifications: row.pref_notifications,
                theme,
            },
            favorites: row.favorites.into_iter().map(CafeId::from).collect(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// User row joined with its password hash, for the login path only.
#[derive(Debug, sqlx::FromRow)]
struct UserAuthRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

/// Repository for user operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new account with its hashed password.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` when the email is already registered.
    pub async fn create(&self, email: &Email, password_hash: &str) -> Result<User, RepositoryError> {
        let sql = format!(
            r"
            INSERT INTO users (id, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(UserId::new())
            .bind(email)
            .bind(password_hash)
            .fetch_one(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return RepositoryError::Conflict(
                        "An account with this email already exists".to_string(),
                    );
                }
                RepositoryError::Database(e)
            })?;

        row.try_into()
    }

    /// Fetch one user by id.
    ///
    /// # Errors
    ///
    /// Returns `Database` on query failure or `DataCorruption` for
    /// undecodable rows.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }

    /// Fetch one user by email.
    ///
    /// # Errors
    ///
    /// Returns `Database` on query failure or `DataCorruption` for
    /// undecodable rows.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }

    /// Fetch a user and their password hash for credential verification.
    ///
    /// # Errors
    ///
    /// Returns `Database` on query failure or `DataCorruption` for
    /// undecodable rows.
    pub async fn get_by_email_with_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1");
        let row = sqlx::query_as::<_, UserAuthRow>(&sql)
            .bind(email)
            .fetch_optional(self.pool)
            .await?;

        row.map(|auth| Ok((auth.user.try_into()?, auth.password_hash)))
            .transpose()
    }

    /// Fetch just the password hash for re-verification flows.
    ///
    /// # Errors
    ///
    /// Returns `Database` on query failure.
    pub async fn get_password_hash(&self, id: UserId) -> Result<Option<String>, RepositoryError> {
        let hash = sqlx::query_scalar::<_, String>(r"SELECT password_hash FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(hash)
    }

    /// Whether another account already uses this email.
    ///
    /// # Errors
    ///
    /// Returns `Database` on query failure.
    pub async fn email_taken(&self, email: &Email, exclude: UserId) -> Result<bool, RepositoryError> {
        let taken = sqlx::query_scalar::<_, bool>(
            r"SELECT EXISTS (SELECT 1 FROM users WHERE email = $1 AND id <> $2)",
        )
        .bind(email)
        .bind(exclude)
        .fetch_one(self.pool)
        .await?;

        Ok(taken)
    }

    /// Persist profile fields, preferences, and favorites.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown ids and `Conflict` when the email
    /// collides with another account.
    pub async fn save(&self, user: &User) -> Result<User, RepositoryError> {
        let sql = format!(
            r"
            UPDATE users SET
                email = $2, first_name = $3, last_name = $4, bio = $5,
                location = $6, pref_notifications = $7, pref_theme = $8,
                favorites = $9, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "
        );
        let favorites: Vec<Uuid> = user.favorites.iter().map(CafeId::as_uuid).collect();

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user.id)
            .bind(&user.email)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.bio)
            .bind(&user.location)
            .bind(user.preferences.notifications)
            .bind(user.preferences.theme.as_str())
            .bind(&favorites)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return RepositoryError::Conflict(
                        "Email already taken by another user".to_string(),
                    );
                }
                RepositoryError::Database(e)
            })?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// Replace a user's password hash.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown ids.
    pub async fn update_password(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query(r"UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Stamp the last successful login. Missing rows are ignored.
    ///
    /// # Errors
    ///
    /// Returns `Database` on query failure.
    pub async fn touch_last_login(&self, id: UserId) -> Result<(), RepositoryError> {
        sqlx::query(r"UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Delete an account, reporting whether it existed.
    ///
    /// # Errors
    ///
    /// Returns `Database` on query failure.
    pub async fn delete(&self, id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(r"DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All accounts, newest first. Admin listing only.
    ///
    /// # Errors
    ///
    /// Returns `Database` on query failure or `DataCorruption` for
    /// undecodable rows.
    pub async fn list_all(&self) -> Result<Vec<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(User::try_from).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_row() -> UserRow {
        UserRow {
            id: UserId::new(),
            email: "buffer@overflow.cafe".to_string(),
            first_name: Some("Ada".to_string()),
            last_name: None,
            bio: None,
            location: None,
            is_active: true,
            last_login: None,
            pref_notifications: true,
            pref_theme: "dark".to_string(),
            favorites: vec![Uuid::new_v4()],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_decodes_into_domain() {
        let user = User::try_from(sample_row()).unwrap();
        assert_eq!(user.email.as_str(), "buffer@overflow.cafe");
        assert_eq!(user.preferences.theme, Theme::Dark);
        assert_eq!(user.favorites.len(), 1);
    }

    #[test]
    fn test_row_rejects_invalid_email() {
        let mut row = sample_row();
        row.email = "not an email".to_string();
        let err = User::try_from(row).unwrap_err();
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
    }

    #[test]
    fn test_row_rejects_unknown_theme() {
        let mut row = sample_row();
        row.pref_theme = "solarized".to_string();
        let err = User::try_from(row).unwrap_err();
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
    }
}
