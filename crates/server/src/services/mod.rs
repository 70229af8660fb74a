//! Application services sitting between the HTTP layer and the repositories.

pub mod auth;
pub mod rate_limit;
pub mod speedtest;

pub use auth::{AuthError, AuthService, TokenSigner};
pub use rate_limit::{RateLimitDecision, RateLimitStore, RateLimiter};
pub use speedtest::{SpeedTestClient, SpeedTestResults};
