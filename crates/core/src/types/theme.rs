//! UI theme preference.

use serde::{Deserialize, Serialize};

/// A user's preferred color theme.
///
/// Stored as lowercase text in the database and on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    Auto,
}

impl Theme {
    /// The canonical string form, matching the serde representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::Auto => "auto",
        }
    }
}

impl core::fmt::Display for Theme {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known theme.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown theme: {0} (expected light, dark, or auto)")]
pub struct UnknownTheme(pub String);

impl core::str::FromStr for Theme {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "auto" => Ok(Self::Auto),
            other => Err(UnknownTheme(other.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_auto() {
        assert_eq!(Theme::default(), Theme::Auto);
    }

    #[test]
    fn test_roundtrip() {
        for theme in [Theme::Light, Theme::Dark, Theme::Auto] {
            assert_eq!(theme.as_str().parse::<Theme>().unwrap(), theme);
            let json = serde_json::to_string(&theme).unwrap();
            assert_eq!(json, format!("\"{theme}\""));
        }
    }

    #[test]
    fn test_unknown_rejected() {
        assert!("solarized".parse::<Theme>().is_err());
        assert!(serde_json::from_str::<Theme>("\"solarized\"").is_err());
    }
}
