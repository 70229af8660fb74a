//! WiFi speed vocabulary: metrics, quality tiers, and leaderboard badges.

use serde::{Deserialize, Serialize};

/// Download speed below which a cafe counts as "slow wifi", in Mbps.
///
/// The whole site is built around celebrating cafes under this line.
pub const SLOW_WIFI_THRESHOLD_MBPS: f64 = 5.0;

/// Round to the two-decimal precision used for speeds, averages, and
/// distances throughout the API.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// The measurable dimensions of a connection, used to pick a leaderboard
/// ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpeedMetric {
    #[default]
    Download,
    Upload,
    Ping,
}

impl SpeedMetric {
    /// The canonical string form, matching the serde representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Download => "download",
            Self::Upload => "upload",
            Self::Ping => "ping",
        }
    }
}

impl core::fmt::Display for SpeedMetric {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known speed metric.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown speed metric: {0} (expected download, upload, or ping)")]
pub struct UnknownMetric(pub String);

impl core::str::FromStr for SpeedMetric {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "download" => Ok(Self::Download),
            "upload" => Ok(Self::Upload),
            "ping" => Ok(Self::Ping),
            other => Err(UnknownMetric(other.to_owned())),
        }
    }
}

/// Connection quality tier, derived from download speed alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpeedQuality {
    Excellent,
    Good,
    Fair,
    Slow,
    VerySlow,
}

impl SpeedQuality {
    /// Classify a download speed in Mbps.
    ///
    /// Tiers: >=25 excellent, >=10 good, >=5 fair, >=1 slow, else very slow.
    #[must_use]
    pub fn from_download_mbps(download: f64) -> Self {
        if download >= 25.0 {
            Self::Excellent
        } else if download >= 10.0 {
            Self::Good
        } else if download >= 5.0 {
            Self::Fair
        } else if download >= 1.0 {
            Self::Slow
        } else {
            Self::VerySlow
        }
    }

    /// The canonical string form, matching the serde representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Slow => "slow",
            Self::VerySlow => "very-slow",
        }
    }
}

impl core::fmt::Display for SpeedQuality {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A human recommendation for what a connection is good for.
#[must_use]
pub fn speed_recommendation(download: f64, ping: f64) -> &'static str {
    if download >= 25.0 && ping <= 20.0 {
        "Perfect for video calls, streaming, and large file downloads"
    } else if download >= 10.0 && ping <= 50.0 {
        "Good for general browsing, email, and light streaming"
    } else if download >= 5.0 {
        "Suitable for basic browsing and messaging"
    } else if download >= 1.0 {
        "Limited to text-based activities and email"
    } else {
        "Connection may be too slow for most activities"
    }
}

/// A decorative badge attached to a leaderboard rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankBadge {
    pub name: &'static str,
    pub color: &'static str,
    pub icon: &'static str,
}

impl RankBadge {
    /// The badge for a 1-based leaderboard rank.
    #[must_use]
    pub const fn for_rank(rank: usize) -> Self {
        match rank {
            1 => Self {
                name: "Speed Champion",
                color: "gold",
                icon: "\u{1f3c6}",
            },
            2 => Self {
                name: "Speed Runner-up",
                color: "silver",
                icon: "\u{1f948}",
            },
            3 => Self {
                name: "Speed Bronze",
                color: "bronze",
                icon: "\u{1f949}",
            },
            4 | 5 => Self {
                name: "Top 5",
                color: "blue",
                icon: "\u{2b50}",
            },
            6..=10 => Self {
                name: "Top 10",
                color: "green",
                icon: "\u{1f4f6}",
            },
            _ => Self {
                name: "Participant",
                color: "gray",
                icon: "\u{1f4ca}",
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_tiers() {
        assert_eq!(SpeedQuality::from_download_mbps(25.0), SpeedQuality::Excellent);
        assert_eq!(SpeedQuality::from_download_mbps(24.99), SpeedQuality::Good);
        assert_eq!(SpeedQuality::from_download_mbps(10.0), SpeedQuality::Good);
        assert_eq!(SpeedQuality::from_download_mbps(9.99), SpeedQuality::Fair);
        assert_eq!(SpeedQuality::from_download_mbps(5.0), SpeedQuality::Fair);
        assert_eq!(SpeedQuality::from_download_mbps(4.99), SpeedQuality::Slow);
        assert_eq!(SpeedQuality::from_download_mbps(1.0), SpeedQuality::Slow);
        assert_eq!(SpeedQuality::from_download_mbps(0.4), SpeedQuality::VerySlow);
    }

    #[test]
    fn test_quality_wire_form() {
        assert_eq!(
            serde_json::to_string(&SpeedQuality::VerySlow).unwrap(),
            "\"very-slow\""
        );
    }

    #[test]
    fn test_recommendations_follow_tiers() {
        assert!(speed_recommendation(30.0, 15.0).starts_with("Perfect"));
        assert!(speed_recommendation(30.0, 80.0).starts_with("Good"));
        assert!(speed_recommendation(12.0, 40.0).starts_with("Good"));
        assert!(speed_recommendation(6.0, 100.0).starts_with("Suitable"));
        assert!(speed_recommendation(2.0, 100.0).starts_with("Limited"));
        assert!(speed_recommendation(0.5, 10.0).contains("too slow"));
    }

    #[test]
    fn test_badges() {
        assert_eq!(RankBadge::for_rank(1).name, "Speed Champion");
        assert_eq!(RankBadge::for_rank(2).color, "silver");
        assert_eq!(RankBadge::for_rank(3).name, "Speed Bronze");
        assert_eq!(RankBadge::for_rank(4).name, "Top 5");
        assert_eq!(RankBadge::for_rank(5).name, "Top 5");
        assert_eq!(RankBadge::for_rank(6).name, "Top 10");
        assert_eq!(RankBadge::for_rank(10).name, "Top 10");
        assert_eq!(RankBadge::for_rank(11).name, "Participant");
    }

    #[test]
    fn test_metric_parse() {
        assert_eq!("upload".parse::<SpeedMetric>().unwrap(), SpeedMetric::Upload);
        assert!("latency".parse::<SpeedMetric>().is_err());
    }

    #[test]
    fn test_round2() {
        assert!((round2(3.14159) - 3.14).abs() < f64::EPSILON);
        assert!((round2(2.666_666) - 2.67).abs() < f64::EPSILON);
        assert!((round2(5.0) - 5.0).abs() < f64::EPSILON);
    }
}
