//! Account handlers: registration, sessions, profile, favorites, activity.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use cafe_wifi_core::types::{CafeId, Email};
use chrono::{TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::db::{CafeRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::{CafeDto, PublicUser, RatingEntry, SpeedTestEntry};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;
use crate::validation::{self, TimeRange};

use super::enforce_ip_quota;

#[derive(Debug, Deserialize)]
pub struct CredentialsBody {
    email: Option<String>,
    password: Option<String>,
}

impl CredentialsBody {
    fn required(&self) -> Result<(&str, &str)> {
        match (self.email.as_deref(), self.password.as_deref()) {
            (Some(email), Some(password)) => Ok((email, password)),
            _ => Err(AppError::BadRequest(
                "Email and password are required".to_string(),
            )),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    token: String,
    user: PublicUser,
}

/// `POST /api/users/signup` - register an account.
pub async fn signup(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CredentialsBody>,
) -> Result<(StatusCode, Json<SessionResponse>)> {
    enforce_ip_quota(&state, &headers).await?;
    let (email, password) = body.required()?;

    let (user, token) = AuthService::new(state.pool(), state.tokens())
        .signup(email, password)
        .await?;

    tracing::info!(user_id = %user.id, "account created");
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            token,
            user: user.into(),
        }),
    ))
}

/// `POST /api/users/login` - exchange credentials for an access token.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CredentialsBody>,
) -> Result<Json<SessionResponse>> {
    enforce_ip_quota(&state, &headers).await?;
    let (email, password) = body.required()?;

    let (user, token) = AuthService::new(state.pool(), state.tokens())
        .login(email, password)
        .await?;

    Ok(Json(SessionResponse {
        token,
        user: user.into(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshBody {
    refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    access_token: String,
    refresh_token: String,
    user: PublicUser,
}

/// `POST /api/users/refresh-token` - rotate a refresh token into a fresh
/// access/refresh pair.
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(body): Json<RefreshBody>,
) -> Result<Json<RefreshResponse>> {
    let token = body
        .refresh_token
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("Refresh token is required".to_string()))?;

    let (user, access_token, refresh_token) = AuthService::new(state.pool(), state.tokens())
        .refresh(token)
        .await?;

    Ok(Json(RefreshResponse {
        access_token,
        refresh_token,
        user: user.into(),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStats {
    cafes_added: usize,
    ratings_given: usize,
    average_rating_given: f64,
    member_for_days: i64,
    last_active_days_ago: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct RatedCafeRef {
    id: CafeId,
    name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRating {
    cafe: RatedCafeRef,
    rating: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    review: Option<String>,
    created_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    user: PublicUser,
    stats: ProfileStats,
    cafes: Vec<CafeDto>,
    ratings: Vec<ProfileRating>,
}

/// `GET /api/users/profile` - the caller's profile with contribution stats.
pub async fn profile(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>> {
    let repo = CafeRepository::new(state.pool());
    let added = repo.added_by_since(user.id, None).await?;
    let rated = repo.rated_by(user.id).await?;

    let mut ratings = Vec::new();
    for cafe in &rated {
        if let Some(entry) = cafe.ratings.iter().find(|r| r.user_id == user.id) {
            ratings.push(ProfileRating {
                cafe: RatedCafeRef {
                    id: cafe.id,
                    name: cafe.name.clone(),
                },
                rating: entry.rating,
                review: entry.review.clone(),
                created_at: entry.created_at,
            });
        }
    }

    let ratings_given = ratings.len();
    let average_rating_given = if ratings_given == 0 {
        0.0
    } else {
        let sum: f64 = ratings.iter().map(|r| r.rating).sum();
        #[allow(clippy::cast_precision_loss)]
        let mean = sum / ratings_given as f64;
        (mean * 10.0).round() / 10.0
    };

    let now = Utc::now();
    let stats = ProfileStats {
        cafes_added: added.len(),
        ratings_given,
        average_rating_given,
        member_for_days: (now - user.created_at).num_days(),
        last_active_days_ago: user.last_login.map(|at| (now - at).num_days()),
    };

    Ok(Json(ProfileResponse {
        user: user.into(),
        stats,
        cafes: added.into_iter().map(CafeDto::from).collect(),
        ratings,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesPatch {
    notifications: Option<bool>,
    theme: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileBody {
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    bio: Option<String>,
    location: Option<String>,
    preferences: Option<PreferencesPatch>,
}

#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    user: PublicUser,
}

/// `PUT /api/users/profile` - update profile fields and preferences. Only
/// the fields present in the body are touched.
pub async fn update_profile(
    RequireAuth(mut user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<UpdateProfileBody>,
) -> Result<Json<UserEnvelope>> {
    let users = UserRepository::new(state.pool());

    if let Some(raw) = body.email.as_deref() {
        let email = Email::parse(raw).map_err(AuthError::from)?;
        if email != user.email && users.email_taken(&email, user.id).await? {
            return Err(AuthError::EmailTaken.into());
        }
        user.email = email;
    }
    if body.first_name.is_some() {
        user.first_name = validation::profile_field("First name", body.first_name.as_deref(), 50)?;
    }
    if body.last_name.is_some() {
        user.last_name = validation::profile_field("Last name", body.last_name.as_deref(), 50)?;
    }
    if body.bio.is_some() {
        user.bio = validation::profile_field("Bio", body.bio.as_deref(), 200)?;
    }
    if body.location.is_some() {
        user.location = validation::profile_field("Location", body.location.as_deref(), 100)?;
    }
    if let Some(prefs) = body.preferences {
        if let Some(notifications) = prefs.notifications {
            user.preferences.notifications = notifications;
        }
        if let Some(raw) = prefs.theme.as_deref() {
            user.preferences.theme = raw.parse().map_err(|_| {
                AppError::BadRequest("Theme must be light, dark, or auto".to_string())
            })?;
        }
    }

    let saved = users.save(&user).await?;
    Ok(Json(UserEnvelope { user: saved.into() }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordBody {
    current_password: Option<String>,
    new_password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    message: &'static str,
}

/// `PUT /api/users/change-password` - rotate the caller's password.
pub async fn change_password(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<ChangePasswordBody>,
) -> Result<Json<MessageResponse>> {
    let (current, new) = match (
        body.current_password.as_deref(),
        body.new_password.as_deref(),
    ) {
        (Some(current), Some(new)) => (current, new),
        _ => {
            return Err(AppError::BadRequest(
                "Current password and new password are required".to_string(),
            ));
        }
    };

    AuthService::new(state.pool(), state.tokens())
        .change_password(user.id, current, new)
        .await?;

    Ok(Json(MessageResponse {
        message: "Password changed successfully",
    }))
}

#[derive(Debug, Deserialize)]
pub struct DeleteAccountBody {
    password: Option<String>,
}

/// `DELETE /api/users/account` - delete the caller's account. The password
/// is re-verified before anything is removed.
pub async fn delete_account(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<DeleteAccountBody>,
) -> Result<Json<MessageResponse>> {
    let password = body
        .password
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("Password is required".to_string()))?;

    AuthService::new(state.pool(), state.tokens())
        .delete_account(user.id, password)
        .await?;

    tracing::info!(user_id = %user.id, "account deleted");
    Ok(Json(MessageResponse {
        message: "Account deleted successfully",
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityQuery {
    time_range: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    cafes_added: usize,
    ratings_given: usize,
    speed_tests_submitted: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySpeedTest {
    cafe: RatedCafeRef,
    download: f64,
    upload: f64,
    ping: f64,
    device_type: String,
    timestamp: chrono::DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResponse {
    time_range: &'static str,
    summary: ActivitySummary,
    cafes: Vec<CafeDto>,
    ratings: Vec<ProfileRating>,
    speed_tests: Vec<ActivitySpeedTest>,
}

/// `GET /api/users/activity` - the caller's contributions over a window
/// (`timeRange` of `7d`, `30d`, or `90d`).
pub async fn activity(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<ActivityResponse>> {
    let range = TimeRange::parse(query.time_range.as_deref())?;
    let since = Utc::now() - TimeDelta::days(range.days());

    let repo = CafeRepository::new(state.pool());
    let added = repo.added_by_since(user.id, Some(since)).await?;
    let rated = repo.rated_by(user.id).await?;
    let tested = repo.speed_tested_by(user.id).await?;

    let in_window =
        |entry: &RatingEntry| entry.user_id == user.id && entry.created_at >= since;
    let mut ratings = Vec::new();
    for cafe in &rated {
        if let Some(entry) = cafe.ratings.iter().find(|r| in_window(r)) {
            ratings.push(ProfileRating {
                cafe: RatedCafeRef {
                    id: cafe.id,
                    name: cafe.name.clone(),
                },
                rating: entry.rating,
                review: entry.review.clone(),
                created_at: entry.created_at,
            });
        }
    }

    let mine = |entry: &&SpeedTestEntry| {
        entry.user_id == Some(user.id) && entry.timestamp >= since
    };
    let mut speed_tests = Vec::new();
    for cafe in &tested {
        for entry in cafe.speed_tests.iter().filter(mine) {
            speed_tests.push(ActivitySpeedTest {
                cafe: RatedCafeRef {
                    id: cafe.id,
                    name: cafe.name.clone(),
                },
                download: entry.download,
                upload: entry.upload,
                ping: entry.ping,
                device_type: entry.device_type.clone(),
                timestamp: entry.timestamp,
            });
        }
    }

    Ok(Json(ActivityResponse {
        time_range: range.label(),
        summary: ActivitySummary {
            cafes_added: added.len(),
            ratings_given: ratings.len(),
            speed_tests_submitted: speed_tests.len(),
        },
        cafes: added.into_iter().map(CafeDto::from).collect(),
        ratings,
        speed_tests,
    }))
}

#[derive(Debug, Serialize)]
pub struct FavoritesResponse {
    favorites: Vec<CafeDto>,
    count: usize,
}

/// `GET /api/users/favorites` - the caller's favorite cafes, skipping any
/// that have since been deactivated.
pub async fn favorites(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<FavoritesResponse>> {
    let favorites: Vec<CafeDto> = CafeRepository::new(state.pool())
        .by_ids(&user.favorites)
        .await?
        .into_iter()
        .filter(|cafe| cafe.is_active)
        .map(CafeDto::from)
        .collect();
    let count = favorites.len();

    Ok(Json(FavoritesResponse { favorites, count }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleFavoriteResponse {
    action: &'static str,
    total_favorites: usize,
    message: String,
}

/// `POST /api/users/favorites/{id}` - flip a cafe in or out of favorites.
pub async fn toggle_favorite(
    RequireAuth(mut user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ToggleFavoriteResponse>> {
    let id: CafeId = id.parse()?;

    let cafe = CafeRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cafe not found".to_string()))?;

    let added = user.toggle_favorite(id);
    let saved = UserRepository::new(state.pool()).save(&user).await?;

    let action = if added { "added" } else { "removed" };
    let message = if added {
        format!("{} added to favorites", cafe.name)
    } else {
        format!("{} removed from favorites", cafe.name)
    };
    Ok(Json(ToggleFavoriteResponse {
        action,
        total_favorites: saved.favorites.len(),
        message,
    }))
}

#[derive(Debug, Serialize)]
pub struct UsersListResponse {
    users: Vec<PublicUser>,
    count: usize,
}

/// `GET /api/users` - every account. Admin key only.
pub async fn list_users(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<UsersListResponse>> {
    let users: Vec<PublicUser> = UserRepository::new(state.pool())
        .list_all()
        .await?
        .into_iter()
        .map(PublicUser::from)
        .collect();
    let count = users.len();

    Ok(Json(UsersListResponse { users, count }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_body_requires_both_fields() {
        let body: CredentialsBody = serde_json::from_str(r#"{"email":"a@b.cafe"}"#).unwrap();
        assert!(body.required().is_err());

        let body: CredentialsBody =
            serde_json::from_str(r#"{"email":"a@b.cafe","password":"Hunter21"}"#).unwrap();
        let (email, password) = body.required().unwrap();
        assert_eq!(email, "a@b.cafe");
        assert_eq!(password, "Hunter21");
    }

    #[test]
    fn test_update_profile_body_distinguishes_absent_fields() {
        let body: UpdateProfileBody =
            serde_json::from_str(r#"{"bio":"ships typos","preferences":{"theme":"dark"}}"#)
                .unwrap();
        assert_eq!(body.bio.as_deref(), Some("ships typos"));
        assert!(body.first_name.is_none());
        let prefs = body.preferences.unwrap();
        assert_eq!(prefs.theme.as_deref(), Some("dark"));
        assert!(prefs.notifications.is_none());
    }
}
