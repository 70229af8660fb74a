//! Core types for Cafe WiFi.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod amenity;
pub mod email;
pub mod id;
pub mod theme;
pub mod token;
pub mod wifi;

pub use amenity::Amenity;
pub use email::{Email, EmailError};
pub use id::{CafeId, IdParseError, RequestId, UserId};
pub use theme::Theme;
pub use token::TokenKind;
pub use wifi::{
    RankBadge, SLOW_WIFI_THRESHOLD_MBPS, SpeedMetric, SpeedQuality, round2, speed_recommendation,
};
