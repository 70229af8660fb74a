//! The closed set of amenities a cafe can advertise.

use serde::{Deserialize, Serialize};

/// An amenity offered by a cafe.
///
/// The wire and database representation is the kebab-case string
/// (e.g. `"power-outlets"`); unknown strings are rejected at the
/// deserialization boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Amenity {
    Wifi,
    PowerOutlets,
    Quiet,
    OutdoorSeating,
    Parking,
    Food,
    Beverages,
    Restroom,
}

impl Amenity {
    /// All known amenities, in display order.
    pub const ALL: [Self; 8] = [
        Self::Wifi,
        Self::PowerOutlets,
        Self::Quiet,
        Self::OutdoorSeating,
        Self::Parking,
        Self::Food,
        Self::Beverages,
        Self::Restroom,
    ];

    /// The canonical string form, matching the serde representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wifi => "wifi",
            Self::PowerOutlets => "power-outlets",
            Self::Quiet => "quiet",
            Self::OutdoorSeating => "outdoor-seating",
            Self::Parking => "parking",
            Self::Food => "food",
            Self::Beverages => "beverages",
            Self::Restroom => "restroom",
        }
    }
}

impl core::fmt::Display for Amenity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known amenity.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown amenity: {0}")]
pub struct UnknownAmenity(pub String);

impl core::str::FromStr for Amenity {
    type Err = UnknownAmenity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| UnknownAmenity(s.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_uses_kebab_case() {
        let json = serde_json::to_string(&Amenity::PowerOutlets).unwrap();
        assert_eq!(json, "\"power-outlets\"");

        let back: Amenity = serde_json::from_str("\"outdoor-seating\"").unwrap();
        assert_eq!(back, Amenity::OutdoorSeating);
    }

    #[test]
    fn test_serde_rejects_unknown() {
        assert!(serde_json::from_str::<Amenity>("\"pool-table\"").is_err());
    }

    #[test]
    fn test_from_str_matches_as_str() {
        for amenity in Amenity::ALL {
            assert_eq!(amenity.as_str().parse::<Amenity>().unwrap(), amenity);
        }
    }

    #[test]
    fn test_from_str_unknown() {
        let err = "jacuzzi".parse::<Amenity>().unwrap_err();
        assert_eq!(err.0, "jacuzzi");
    }
}
