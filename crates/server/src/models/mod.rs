//! Domain models for cafes and users.
//!
//! These types carry the business rules (rating aggregation, speed-test
//! history, favorites) independent of how rows are stored or serialized.

pub mod cafe;
pub mod user;

pub use cafe::{
    Cafe, CafeDto, CafeStats, DayHours, GeoPoint, LocationCount, NewCafe, RatingEntry,
    RatingSummary, SpeedTestEntry, WeeklyHours, WifiSpeed,
};
pub use user::{PublicUser, User, UserPreferences};
