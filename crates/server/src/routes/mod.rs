//! HTTP route handlers for the cafe directory API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /                           - API status message
//! GET    /api/health                 - Health check (includes database ping)
//!
//! # Cafes
//! GET    /api/cafes                  - List cafes (search, filters, sort, geo, pagination)
//! POST   /api/cafes                  - Add a cafe (auth)
//! PUT    /api/cafes                  - Update a cafe (id in body)
//! DELETE /api/cafes                  - Delete a cafe (id in body)
//! GET    /api/cafes/stats            - Directory statistics (cached)
//! GET    /api/cafes/leaderboard      - Speed leaderboard by metric
//! POST   /api/cafes/rate             - Rate a cafe (auth)
//! POST   /api/cafes/speed-test       - Submit a manual speed test (auth)
//! DELETE /api/cafes/bulk             - Bulk delete cafes (admin key)
//! GET    /api/cafes/{id}             - Cafe detail
//! GET    /api/cafes/{id}/reviews     - Paginated reviews for a cafe
//!
//! # Users
//! POST   /api/users/signup           - Register (rate limited per IP)
//! POST   /api/users/login            - Login (rate limited per IP)
//! POST   /api/users/refresh-token    - Exchange a refresh token for new tokens
//! GET    /api/users/profile          - Profile with activity stats (auth)
//! PUT    /api/users/profile          - Update profile and preferences (auth)
//! PUT    /api/users/change-password  - Change password (auth)
//! DELETE /api/users/account          - Delete account (auth)
//! GET    /api/users/activity         - Activity feed over a time range (auth)
//! GET    /api/users/favorites        - Favorite cafes (auth)
//! POST   /api/users/favorites/{id}   - Toggle a favorite (auth)
//! GET    /api/users                  - List all users (admin key)
//!
//! # Speed tests
//! GET    /api/speedtest/quick        - Run a speed test without persisting
//! POST   /api/speedtest/run/{id}     - Run a speed test and record it for a cafe
//! GET    /api/speedtest/history/{id} - Speed-test history for a cafe
//! POST   /api/speedtest/compare      - Compare wifi speeds across cafes
//!
//! # Admin
//! POST   /api/admin/verify           - Verify an admin key and issue an admin token
//! ```
//!
//! The `/` and `/api/health` handlers are wired up in `main`.

pub mod admin;
pub mod cafes;
pub mod speedtest;
pub mod users;

use axum::{
    Router,
    http::HeaderMap,
    routing::{delete, get, post, put},
};

use crate::error::AppError;
use crate::middleware::client_ip;
use crate::services::rate_limit::DEFAULT_QUOTA;
use crate::state::AppState;

/// Charge the per-IP write quota shared by cafe mutations and account
/// registration. Returns 429 once the window is exhausted.
async fn enforce_ip_quota(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let ip = client_ip(headers);
    let decision = state
        .limiter()
        .check(&format!("ip:{ip}"), DEFAULT_QUOTA)
        .await;
    if decision.allowed {
        Ok(())
    } else {
        tracing::warn!(%ip, "write quota exhausted");
        Err(AppError::RateLimited {
            retry_after_secs: decision.retry_after_secs(),
        })
    }
}

/// Create the cafe routes router.
pub fn cafe_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(cafes::list)
                .post(cafes::create)
                .put(cafes::update)
                .delete(cafes::remove),
        )
        .route("/stats", get(cafes::stats))
        .route("/leaderboard", get(cafes::leaderboard))
        .route("/rate", post(cafes::rate))
        .route("/speed-test", post(cafes::submit_speed_test))
        .route("/bulk", delete(cafes::bulk_delete))
        .route("/{id}", get(cafes::get_by_id))
        .route("/{id}/reviews", get(cafes::reviews))
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(users::signup))
        .route("/login", post(users::login))
        .route("/refresh-token", post(users::refresh_token))
        .route("/profile", get(users::profile).put(users::update_profile))
        .route("/change-password", put(users::change_password))
        .route("/account", delete(users::delete_account))
        .route("/activity", get(users::activity))
        .route("/favorites", get(users::favorites))
        .route("/favorites/{id}", post(users::toggle_favorite))
        .route("/", get(users::list_users))
}

/// Create the speed test routes router.
pub fn speedtest_routes() -> Router<AppState> {
    Router::new()
        .route("/quick", get(speedtest::quick))
        .route("/run/{id}", post(speedtest::run_for_cafe))
        .route("/history/{id}", get(speedtest::history))
        .route("/compare", post(speedtest::compare))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/verify", post(admin::verify))
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Cafe directory
        .nest("/api/cafes", cafe_routes())
        // Accounts and profiles
        .nest("/api/users", user_routes())
        // Speed test runner
        .nest("/api/speedtest", speedtest_routes())
        // Admin key verification
        .nest("/api/admin", admin_routes())
}
