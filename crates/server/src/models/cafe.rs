//! Cafe domain model.
//!
//! A cafe carries its full rating and speed-test history inline. Mutations
//! (`apply_rating`, `record_speed_test`) keep the denormalized aggregates
//! (`rating`, `wifi_speed`) consistent with those histories.

use cafe_wifi_core::types::{Amenity, CafeId, SLOW_WIFI_THRESHOLD_MBPS, UserId, round2};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Oldest speed-test entries are dropped beyond this many.
pub const SPEED_TEST_HISTORY_CAP: usize = 50;

/// How many of the newest entries feed the rolling wifi averages.
pub const SPEED_TEST_AVERAGE_WINDOW: usize = 10;

/// Denormalized wifi speed summary, recomputed on every recorded test.
///
/// All measurements are `None` until the first speed test is recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WifiSpeed {
    pub download: Option<f64>,
    pub upload: Option<f64>,
    pub ping: Option<f64>,
    pub last_tested: Option<DateTime<Utc>>,
}

/// One user's rating of a cafe, at most one entry per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingEntry {
    pub user_id: UserId,
    pub rating: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One recorded speed test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedTestEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub download: f64,
    pub upload: f64,
    pub ping: f64,
    pub device_type: String,
    pub timestamp: DateTime<Utc>,
}

/// Opening and closing time for one day, free-form strings like "08:00".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayHours {
    pub open: String,
    pub close: String,
}

/// Weekly opening hours; days without an entry are treated as closed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklyHours {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monday: Option<DayHours>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tuesday: Option<DayHours>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wednesday: Option<DayHours>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thursday: Option<DayHours>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friday: Option<DayHours>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturday: Option<DayHours>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunday: Option<DayHours>,
}

/// Denormalized rating aggregate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub average: f64,
    pub count: u32,
}

/// WGS 84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Cafe count for one area, used by the directory statistics.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct LocationCount {
    pub area: String,
    pub count: i64,
}

/// Directory-wide statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CafeStats {
    pub total_cafes: i64,
    pub recent_cafes: i64,
    pub top_locations: Vec<LocationCount>,
    pub average_per_day: f64,
}

/// A cafe with its full rating and speed-test history.
#[derive(Debug, Clone, PartialEq)]
pub struct Cafe {
    pub id: CafeId,
    pub name: String,
    pub address: String,
    pub contact: i64,
    pub description: Option<String>,
    pub wifi_speed: WifiSpeed,
    pub amenities: Vec<Amenity>,
    pub hours: Option<WeeklyHours>,
    pub rating: RatingSummary,
    pub ratings: Vec<RatingEntry>,
    pub speed_tests: Vec<SpeedTestEntry>,
    pub location: Option<GeoPoint>,
    pub is_active: bool,
    pub added_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a cafe.
#[derive(Debug, Clone)]
pub struct NewCafe {
    pub name: String,
    pub address: String,
    pub contact: i64,
    pub description: Option<String>,
    pub amenities: Vec<Amenity>,
    pub hours: Option<WeeklyHours>,
    pub location: Option<GeoPoint>,
    pub added_by: Option<UserId>,
}

impl Cafe {
    /// Mean of download and upload, with unmeasured components counted as 0.
    #[must_use]
    pub fn average_wifi_speed(&self) -> f64 {
        let download = self.wifi_speed.download.unwrap_or(0.0);
        let upload = self.wifi_speed.upload.unwrap_or(0.0);
        round2((download + upload) / 2.0)
    }

    /// Whether the measured download speed qualifies for the directory's
    /// slow-wifi badge. Unmeasured cafes do not qualify.
    #[must_use]
    pub fn is_slow_wifi(&self) -> bool {
        self.wifi_speed
            .download
            .is_some_and(|mbps| mbps < SLOW_WIFI_THRESHOLD_MBPS)
    }

    /// Add or replace this user's rating, then recompute the aggregate.
    ///
    /// A user rating the same cafe twice overwrites their earlier entry;
    /// the count never double-counts a user.
    pub fn apply_rating(&mut self, user_id: UserId, rating: f64, review: Option<String>) {
        let entry = RatingEntry {
            user_id,
            rating,
            review,
            created_at: Utc::now(),
        };

        if let Some(existing) = self.ratings.iter_mut().find(|r| r.user_id == user_id) {
            *existing = entry;
        } else {
            self.ratings.push(entry);
        }

        let total: f64 = self.ratings.iter().map(|r| r.rating).sum();
        #[allow(clippy::cast_precision_loss)] // Rating counts stay far below f64 precision
        let count = self.ratings.len() as f64;
        self.rating.average = if self.ratings.is_empty() {
            0.0
        } else {
            total / count
        };
        self.rating.count = u32::try_from(self.ratings.len()).unwrap_or(u32::MAX);
    }

    /// Append a speed test, cap the history, and refresh the wifi summary
    /// from the rolling window of newest entries.
    pub fn record_speed_test(&mut self, entry: SpeedTestEntry) {
        let tested_at = entry.timestamp;
        self.speed_tests.push(entry);

        if self.speed_tests.len() > SPEED_TEST_HISTORY_CAP {
            let excess = self.speed_tests.len() - SPEED_TEST_HISTORY_CAP;
            self.speed_tests.drain(..excess);
        }

        let window: Vec<&SpeedTestEntry> = self
            .speed_tests
            .iter()
            .rev()
            .take(SPEED_TEST_AVERAGE_WINDOW)
            .collect();
        #[allow(clippy::cast_precision_loss)] // Window holds at most 10 entries
        let n = window.len() as f64;
        self.wifi_speed.download =
            Some(round2(window.iter().map(|e| e.download).sum::<f64>() / n));
        self.wifi_speed.upload = Some(round2(window.iter().map(|e| e.upload).sum::<f64>() / n));
        self.wifi_speed.ping = Some(round2(window.iter().map(|e| e.ping).sum::<f64>() / n));
        self.wifi_speed.last_tested = Some(tested_at);
    }
}

/// Wire representation of a cafe.
///
/// Carries the computed `average_wifi_speed` / `is_slow_wifi` fields the
/// clients sort and badge by; the raw rating and speed-test histories stay
/// behind their dedicated endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CafeDto {
    pub id: CafeId,
    pub name: String,
    pub address: String,
    pub contact: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub wifi_speed: WifiSpeed,
    pub amenities: Vec<Amenity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<WeeklyHours>,
    pub rating: RatingSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub average_wifi_speed: f64,
    pub is_slow_wifi: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_from_user: Option<f64>,
}

impl CafeDto {
    /// Attach the distance (km) from the caller's reported position.
    #[must_use]
    pub fn with_distance(mut self, km: f64) -> Self {
        self.distance_from_user = Some(km);
        self
    }
}

impl From<Cafe> for CafeDto {
    fn from(cafe: Cafe) -> Self {
        let average_wifi_speed = cafe.average_wifi_speed();
        let is_slow_wifi = cafe.is_slow_wifi();
        Self {
            id: cafe.id,
            name: cafe.name,
            address: cafe.address,
            contact: cafe.contact,
            description: cafe.description,
            wifi_speed: cafe.wifi_speed,
            amenities: cafe.amenities,
            hours: cafe.hours,
            rating: cafe.rating,
            location: cafe.location,
            is_active: cafe.is_active,
            added_by: cafe.added_by,
            created_at: cafe.created_at,
            updated_at: cafe.updated_at,
            average_wifi_speed,
            is_slow_wifi,
            distance_from_user: None,
        }
    }
}
