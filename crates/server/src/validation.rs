//! Request payload validation.
//!
//! Every function returns the cleaned value on success and a
//! [`ValidationError`] carrying the exact client-facing message on failure.
//! Handlers surface these as 400 responses.

use cafe_wifi_core::types::Amenity;
use serde::Deserialize;
use thiserror::Error;

use crate::models::GeoPoint;

/// A rejected request field, with the message returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name must be between 3-100 characters")]
    Name,
    #[error("Address must be between 10-200 characters")]
    Address,
    #[error("Contact must be a 10-digit number")]
    Contact,
    #[error("Description cannot exceed 500 characters")]
    Description,
    #[error("Review cannot exceed 500 characters")]
    Review,
    #[error("Rating must be between 1 and 5")]
    Rating,
    #[error("Cafe ID is required")]
    CafeIdRequired,
    #[error("Cafe IDs are required")]
    IdsRequired,
    #[error("{field} cannot exceed {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("Valid download speed is required")]
    DownloadRequired,
    #[error("{field} must be between 0 and 1000")]
    SpeedRange { field: &'static str },
    #[error("Latitude must be between -90 and 90")]
    Latitude,
    #[error("Longitude must be between -180 and 180")]
    Longitude,
    #[error("Latitude and longitude must be provided together")]
    LocationPair,
    #[error("Must provide between 1 and 10 cafe IDs")]
    CompareCount,
    #[error("Invalid time range. Use 7d, 30d, or 90d")]
    TimeRange,
    #[error("Invalid amenity: {0}")]
    Amenity(String),
}

/// A JSON field that clients send either as a number or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(i64),
    Text(String),
}

/// Activity window for the user activity endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    Week,
    Month,
    Quarter,
}

impl TimeRange {
    /// Parse a `timeRange` query value. Absent means the default month view.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::TimeRange` for anything other than
    /// `7d`, `30d`, or `90d`.
    pub fn parse(raw: Option<&str>) -> Result<Self, ValidationError> {
        match raw {
            None | Some("30d") => Ok(Self::Month),
            Some("7d") => Ok(Self::Week),
            Some("90d") => Ok(Self::Quarter),
            Some(_) => Err(ValidationError::TimeRange),
        }
    }

    #[must_use]
    pub const fn days(self) -> i64 {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::Quarter => 90,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Week => "7d",
            Self::Month => "30d",
            Self::Quarter => "90d",
        }
    }
}

/// Cafe name, trimmed, 3 to 100 characters.
///
/// # Errors
///
/// Returns `ValidationError::Name` outside that range.
pub fn cafe_name(raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim();
    let len = name.chars().count();
    if (3..=100).contains(&len) {
        Ok(name.to_string())
    } else {
        Err(ValidationError::Name)
    }
}

/// Cafe address, trimmed, 10 to 200 characters.
///
/// # Errors
///
/// Returns `ValidationError::Address` outside that range.
pub fn cafe_address(raw: &str) -> Result<String, ValidationError> {
    let address = raw.trim();
    let len = address.chars().count();
    if (10..=200).contains(&len) {
        Ok(address.to_string())
    } else {
        Err(ValidationError::Address)
    }
}

/// Contact number, accepted as a JSON number or a digit string.
///
/// Digit strings may carry a leading zero; they still parse into the stored
/// numeric form.
///
/// # Errors
///
/// Returns `ValidationError::Contact` unless the value is exactly 10 digits.
pub fn contact_number(raw: &NumberOrText) -> Result<i64, ValidationError> {
    match raw {
        NumberOrText::Number(n) => {
            if (1_000_000_000..=9_999_999_999).contains(n) {
                Ok(*n)
            } else {
                Err(ValidationError::Contact)
            }
        }
        NumberOrText::Text(s) => {
            let digits = s.trim();
            if digits.len() == 10 && digits.bytes().all(|b| b.is_ascii_digit()) {
                digits.parse().map_err(|_| ValidationError::Contact)
            } else {
                Err(ValidationError::Contact)
            }
        }
    }
}

/// Optional description, trimmed, at most 500 characters. Empty becomes
/// `None`.
///
/// # Errors
///
/// Returns `ValidationError::Description` when too long.
pub fn description(raw: Option<&str>) -> Result<Option<String>, ValidationError> {
    bounded_optional(raw, 500).map_err(|()| ValidationError::Description)
}

/// Optional review text, trimmed, at most 500 characters.
///
/// # Errors
///
/// Returns `ValidationError::Review` when too long.
pub fn review(raw: Option<&str>) -> Result<Option<String>, ValidationError> {
    bounded_optional(raw, 500).map_err(|()| ValidationError::Review)
}

/// Optional profile field, trimmed, at most `max` characters.
///
/// # Errors
///
/// Returns `ValidationError::TooLong` naming the field when too long.
pub fn profile_field(
    field: &'static str,
    raw: Option<&str>,
    max: usize,
) -> Result<Option<String>, ValidationError> {
    bounded_optional(raw, max).map_err(|()| ValidationError::TooLong { field, max })
}

fn bounded_optional(raw: Option<&str>, max: usize) -> Result<Option<String>, ()> {
    let Some(text) = raw.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    if text.chars().count() > max {
        return Err(());
    }
    Ok(Some(text.to_string()))
}

/// Star rating, required, 1 to 5 inclusive. Half stars are allowed.
///
/// # Errors
///
/// Returns `ValidationError::Rating` when absent or out of range.
pub fn rating_value(raw: Option<f64>) -> Result<f64, ValidationError> {
    match raw {
        Some(value) if value.is_finite() && (1.0..=5.0).contains(&value) => Ok(value),
        _ => Err(ValidationError::Rating),
    }
}

/// Download speed in Mbps, required and positive, capped at 1000.
///
/// # Errors
///
/// Returns `ValidationError::DownloadRequired` when absent or non-positive,
/// `ValidationError::SpeedRange` above the cap.
pub fn download_speed(raw: Option<f64>) -> Result<f64, ValidationError> {
    match raw {
        Some(value) if value.is_finite() && value > 0.0 => {
            if value <= 1000.0 {
                Ok(value)
            } else {
                Err(ValidationError::SpeedRange {
                    field: "Download speed",
                })
            }
        }
        _ => Err(ValidationError::DownloadRequired),
    }
}

/// Optional speed measurement in Mbps, defaulting to 0.
///
/// # Errors
///
/// Returns `ValidationError::SpeedRange` outside 0 to 1000.
pub fn optional_speed(raw: Option<f64>, field: &'static str) -> Result<f64, ValidationError> {
    match raw {
        None => Ok(0.0),
        Some(value) if value.is_finite() && (0.0..=1000.0).contains(&value) => Ok(value),
        Some(_) => Err(ValidationError::SpeedRange { field }),
    }
}

/// Optional coordinate pair. Both components must be present together and
/// within WGS 84 bounds.
///
/// # Errors
///
/// Returns `ValidationError::LocationPair` for a lone component, otherwise
/// `Latitude` / `Longitude` for out-of-range values.
pub fn coordinates(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<Option<GeoPoint>, ValidationError> {
    match (latitude, longitude) {
        (None, None) => Ok(None),
        (Some(lat), Some(lng)) => {
            if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
                return Err(ValidationError::Latitude);
            }
            if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
                return Err(ValidationError::Longitude);
            }
            Ok(Some(GeoPoint {
                latitude: lat,
                longitude: lng,
            }))
        }
        _ => Err(ValidationError::LocationPair),
    }
}

/// Parse amenity slugs, rejecting the first unknown one.
///
/// # Errors
///
/// Returns `ValidationError::Amenity` naming the unknown slug.
pub fn amenities(raw: &[String]) -> Result<Vec<Amenity>, ValidationError> {
    raw.iter()
        .map(|slug| {
            slug.parse::<Amenity>()
                .map_err(|_| ValidationError::Amenity(slug.clone()))
        })
        .collect()
}
