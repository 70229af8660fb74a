//! User domain model.

use cafe_wifi_core::types::{CafeId, Email, Theme, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-user UI preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub notifications: bool,
    pub theme: Theme,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            notifications: true,
            theme: Theme::Auto,
        }
    }
}

/// A registered account. The password hash lives only in the database and
/// the auth service; it is never part of this type.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub preferences: UserPreferences,
    pub favorites: Vec<CafeId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Flip a cafe in or out of the favorites list.
    ///
    /// Returns `true` when the cafe is a favorite after the call.
    pub fn toggle_favorite(&mut self, cafe_id: CafeId) -> bool {
        if let Some(position) = self.favorites.iter().position(|id| *id == cafe_id) {
            self.favorites.remove(position);
            false
        } else {
            self.favorites.push(cafe_id);
            true
        }
    }
}

/// Wire representation of a user, safe to return to any authenticated caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: UserId,
    pub email: Email,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
    pub preferences: UserPreferences,
    pub favorites: Vec<CafeId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            bio: user.bio,
            location: user.location,
            is_active: user.is_active,
            last_login: user.last_login,
            preferences: user.preferences,
            favorites: user.favorites,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: UserId::new(),
            email: Email::parse("buffer@overflow.cafe").unwrap(),
            first_name: None,
            last_name: None,
            bio: None,
            location: None,
            is_active: true,
            last_login: None,
            preferences: UserPreferences::default(),
            favorites: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_default_preferences() {
        let prefs = UserPreferences::default();
        assert!(prefs.notifications);
        assert_eq!(prefs.theme, Theme::Auto);
    }

    #[test]
    fn test_toggle_favorite_round_trip() {
        let mut user = sample_user();
        let cafe = CafeId::new();

        assert!(user.toggle_favorite(cafe));
        assert_eq!(user.favorites.len(), 1);

        assert!(!user.toggle_favorite(cafe));
        assert!(user.favorites.is_empty());
    }

    #[test]
    fn test_toggle_favorite_keeps_other_entries() {
        let mut user = sample_user();
        let first = CafeId::new();
        let second = CafeId::new();
        user.toggle_favorite(first);
        user.toggle_favorite(second);

        user.toggle_favorite(first);
        assert_eq!(user.favorites, vec![second]);
    }

    #[test]
    fn test_public_user_serializes_camel_case() {
        let mut user = sample_user();
        user.first_name = Some("Ada".to_string());
        let json = serde_json::to_value(PublicUser::from(user)).unwrap();

        assert!(json.get("firstName").is_some());
        assert!(json.get("isActive").is_some());
        assert!(json.get("lastLogin").is_none());
        assert_eq!(json.get("preferences").unwrap().get("theme").unwrap(), "auto");
    }
}
