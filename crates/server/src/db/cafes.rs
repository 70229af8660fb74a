//! Database operations for cafes.

use cafe_wifi_core::types::{CafeId, SpeedMetric, UserId};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use super::RepositoryError;
use crate::models::{
    Cafe, CafeStats, GeoPoint, LocationCount, NewCafe, RatingEntry, RatingSummary, SpeedTestEntry,
    WeeklyHours, WifiSpeed,
};

const CAFE_COLUMNS: &str = "id, name, address, contact, description, \
    wifi_download, wifi_upload, wifi_ping, wifi_last_tested, \
    amenities, hours, rating_average, rating_count, ratings, speed_tests, \
    latitude, longitude, is_active, added_by, created_at, updated_at";

/// Shared predicates for the list, count, and geo queries. Each filter is
/// skipped when its bind is NULL, so one statement covers every combination.
const FILTER_WHERE: &str = "($1::text IS NULL OR name ILIKE $1 OR address ILIKE $1 OR description ILIKE $1)
      AND ($2::double precision IS NULL OR rating_average >= $2)
      AND ($3::double precision IS NULL OR rating_average <= $3)
      AND ($4::double precision IS NULL OR wifi_download >= $4)
      AND ($5::double precision IS NULL OR wifi_download <= $5)
      AND ($6::boolean IS NULL OR is_active = $6)";

/// Raw cafe row; JSONB histories decode through [`Json`].
#[derive(Debug, sqlx::FromRow)]
struct CafeRow {
    id: CafeId,
    name: String,
    address: String,
    contact: i64,
    description: Option<String>,
    wifi_download: Option<f64>,
    wifi_upload: Option<f64>,
    wifi_ping: Option<f64>,
    wifi_last_tested: Option<DateTime<Utc>>,
    amenities: Vec<String>,
    hours: Option<Json<WeeklyHours>>,
    rating_average: f64,
    rating_count: i32,
    ratings: Json<Vec<RatingEntry>>,
    speed_tests: Json<Vec<SpeedTestEntry>>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    is_active: bool,
    added_by: Option<UserId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CafeRow> for Cafe {
    type Error = RepositoryError;

    fn try_from(row: CafeRow) -> Result<Self, Self::Error> {
        let amenities = row
            .amenities
            .iter()
            .map(|slug| slug.parse())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RepositoryError::DataCorruption(format!("cafe {}: {e}", row.id)))?;

        let rating_count = u32::try_from(row.rating_count).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "cafe {}: negative rating count {}",
                row.id, row.rating_count
            ))
        })?;

        let location = match (row.latitude, row.longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint {
                latitude,
                longitude,
            }),
            (None, None) => None,
            _ => {
                return Err(RepositoryError::DataCorruption(format!(
                    "cafe {}: half-missing coordinates",
                    row.id
                )));
            }
        };

        Ok(Self {
            id: row.id,
            name: row.name,
            address: row.address,
            contact: row.contact,
            description: row.description,
            wifi_speed: WifiSpeed {
                download: row.wifi_download,
                upload: row.wifi_upload,
                ping: row.wifi_ping,
                last_tested: row.wifi_last_tested,
            },
            amenities,
            hours: row.hours.map(|Json(hours)| hours),
            rating: RatingSummary {
                average: row.rating_average,
                count: rating_count,
            },
            ratings: row.ratings.0,
            speed_tests: row.speed_tests.0,
            location,
            is_active: row.is_active,
            added_by: row.added_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Sort key for cafe listings. Unknown keys fall back to newest-first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CafeSort {
    #[default]
    CreatedAt,
    Name,
    Rating,
    WifiSpeed,
    Address,
}

impl CafeSort {
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("name") => Self::Name,
            Some("rating") => Self::Rating,
            Some("wifiSpeed") => Self::WifiSpeed,
            Some("address") => Self::Address,
            _ => Self::CreatedAt,
        }
    }

    const fn column(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::Name => "name",
            Self::Rating => "rating_average",
            Self::WifiSpeed => "wifi_download",
            Self::Address => "address",
        }
    }
}

/// Sort direction, defaulting to descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }

    const fn sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            // Unmeasured wifi sorts after measured cafes
            Self::Desc => "DESC NULLS LAST",
        }
    }
}

/// Filters and ordering for cafe listings.
#[derive(Debug, Clone, Default)]
pub struct CafeFilter {
    pub search: Option<String>,
    pub min_rating: Option<f64>,
    pub max_rating: Option<f64>,
    pub min_speed: Option<f64>,
    pub max_speed: Option<f64>,
    pub is_active: Option<bool>,
    pub sort: CafeSort,
    pub order: SortOrder,
}

impl CafeFilter {
    fn search_pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(|term| format!("%{}%", escape_like(term)))
    }
}

/// Escape LIKE wildcards in a user-supplied search term.
fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Repository for cafe operations.
pub struct CafeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CafeRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new cafe.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` when another cafe already uses the same name and
    /// address, or `Database` on other failures.
    pub async fn create(&self, new_cafe: &NewCafe) -> Result<Cafe, RepositoryError> {
        let sql = format!(
            r"
            INSERT INTO cafes (
                id, name, address, contact, description,
                amenities, hours, latitude, longitude, added_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {CAFE_COLUMNS}
            "
        );
        let amenities: Vec<String> = new_cafe
            .amenities
            .iter()
            .map(|a| a.as_str().to_string())
            .collect();

        let row = sqlx::query_as::<_, CafeRow>(&sql)
            .bind(CafeId::new())
            .bind(&new_cafe.name)
            .bind(&new_cafe.address)
            .bind(new_cafe.contact)
            .bind(&new_cafe.description)
            .bind(&amenities)
            .bind(new_cafe.hours.clone().map(Json))
            .bind(new_cafe.location.map(|p| p.latitude))
            .bind(new_cafe.location.map(|p| p.longitude))
            .bind(new_cafe.added_by)
            .fetch_one(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return RepositoryError::Conflict(
                        "A cafe with this name and address already exists".to_string(),
                    );
                }
                RepositoryError::Database(e)
            })?;

        row.try_into()
    }

    /// Fetch one cafe by id.
    ///
    /// # Errors
    ///
    /// Returns `Database` on query failure or `DataCorruption` for
    /// undecodable rows.
    pub async fn get(&self, id: CafeId) -> Result<Option<Cafe>, RepositoryError> {
        let sql = format!("SELECT {CAFE_COLUMNS} FROM cafes WHERE id = $1");
        let row = sqlx::query_as::<_, CafeRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(Cafe::try_from).transpose()
    }

    /// Whether another cafe already uses this name and address,
    /// case-insensitively, excluding `exclude` when updating.
    ///
    /// # Errors
    ///
    /// Returns `Database` on query failure.
    pub async fn find_duplicate(
        &self,
        name: &str,
        address: &str,
        exclude: Option<CafeId>,
    ) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS (
                SELECT 1 FROM cafes
                WHERE LOWER(name) = LOWER($1)
                  AND LOWER(address) = LOWER($2)
                  AND ($3::uuid IS NULL OR id <> $3)
            )
            ",
        )
        .bind(name)
        .bind(address)
        .bind(exclude)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// One page of cafes matching the filter.
    ///
    /// # Errors
    ///
    /// Returns `Database` on query failure or `DataCorruption` for
    /// undecodable rows.
    pub async fn list(
        &self,
        filter: &CafeFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Cafe>, RepositoryError> {
        let sql = format!(
            "SELECT {CAFE_COLUMNS} FROM cafes WHERE {FILTER_WHERE} \
             ORDER BY {} {} LIMIT $7 OFFSET $8",
            filter.sort.column(),
            filter.order.sql(),
        );
        let rows = sqlx::query_as::<_, CafeRow>(&sql)
            .bind(filter.search_pattern())
            .bind(filter.min_rating)
            .bind(filter.max_rating)
            .bind(filter.min_speed)
            .bind(filter.max_speed)
            .bind(filter.is_active)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(Cafe::try_from).collect()
    }

    /// Every cafe matching the filter. The radius search paginates in
    /// process after computing distances, so it needs the full set.
    ///
    /// # Errors
    ///
    /// Returns `Database` on query failure or `DataCorruption` for
    /// undecodable rows.
    pub async fn list_all(&self, filter: &CafeFilter) -> Result<Vec<Cafe>, RepositoryError> {
        let sql = format!(
            "SELECT {CAFE_COLUMNS} FROM cafes WHERE {FILTER_WHERE} ORDER BY {} {}",
            filter.sort.column(),
            filter.order.sql(),
        );
        let rows = sqlx::query_as::<_, CafeRow>(&sql)
            .bind(filter.search_pattern())
            .bind(filter.min_rating)
            .bind(filter.max_rating)
            .bind(filter.min_speed)
            .bind(filter.max_speed)
            .bind(filter.is_active)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(Cafe::try_from).collect()
    }

    /// Number of cafes matching the filter.
    ///
    /// # Errors
    ///
    /// Returns `Database` on query failure.
    pub async fn count(&self, filter: &CafeFilter) -> Result<i64, RepositoryError> {
        let sql = format!("SELECT COUNT(*) FROM cafes WHERE {FILTER_WHERE}");
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(filter.search_pattern())
            .bind(filter.min_rating)
            .bind(filter.max_rating)
            .bind(filter.min_speed)
            .bind(filter.max_speed)
            .bind(filter.is_active)
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// Overwrite a cafe's editable details.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown ids and `Conflict` when the new name
    /// and address collide with another cafe.
    pub async fn update_details(&self, cafe: &Cafe) -> Result<Cafe, RepositoryError> {
        let sql = format!(
            r"
            UPDATE cafes SET
                name = $2, address = $3, contact = $4, description = $5,
                amenities = $6, hours = $7, latitude = $8, longitude = $9,
                is_active = $10, updated_at = NOW()
            WHERE id = $1
            RETURNING {CAFE_COLUMNS}
            "
        );
        let amenities: Vec<String> = cafe
            .amenities
            .iter()
            .map(|a| a.as_str().to_string())
            .collect();

        let row = sqlx::query_as::<_, CafeRow>(&sql)
            .bind(cafe.id)
            .bind(&cafe.name)
            .bind(&cafe.address)
            .bind(cafe.contact)
            .bind(&cafe.description)
            .bind(&amenities)
            .bind(cafe.hours.clone().map(Json))
            .bind(cafe.location.map(|p| p.latitude))
            .bind(cafe.location.map(|p| p.longitude))
            .bind(cafe.is_active)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return RepositoryError::Conflict(
                        "Another cafe with this name and address already exists".to_string(),
                    );
                }
                RepositoryError::Database(e)
            })?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// Replace a cafe's rating history and aggregate.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown ids.
    pub async fn update_ratings(
        &self,
        id: CafeId,
        ratings: &[RatingEntry],
        summary: RatingSummary,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE cafes
            SET ratings = $2, rating_average = $3, rating_count = $4, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(Json(ratings))
        .bind(summary.average)
        .bind(i32::try_from(summary.count).unwrap_or(i32::MAX))
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Replace a cafe's speed-test history and wifi summary.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown ids.
    pub async fn update_speed_tests(
        &self,
        id: CafeId,
        speed_tests: &[SpeedTestEntry],
        wifi: &WifiSpeed,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE cafes
            SET speed_tests = $2, wifi_download = $3, wifi_upload = $4,
                wifi_ping = $5, wifi_last_tested = $6, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(Json(speed_tests))
        .bind(wifi.download)
        .bind(wifi.upload)
        .bind(wifi.ping)
        .bind(wifi.last_tested)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete one cafe, returning it when it existed.
    ///
    /// # Errors
    ///
    /// Returns `Database` on query failure.
    pub async fn delete(&self, id: CafeId) -> Result<Option<Cafe>, RepositoryError> {
        let sql = format!("DELETE FROM cafes WHERE id = $1 RETURNING {CAFE_COLUMNS}");
        let row = sqlx::query_as::<_, CafeRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(Cafe::try_from).transpose()
    }

    /// Delete a batch of cafes, returning how many rows went away.
    ///
    /// # Errors
    ///
    /// Returns `Database` on query failure.
    pub async fn delete_many(&self, ids: &[CafeId]) -> Result<u64, RepositoryError> {
        let uuids: Vec<Uuid> = ids.iter().map(CafeId::as_uuid).collect();
        let result = sqlx::query(r"DELETE FROM cafes WHERE id = ANY($1)")
            .bind(&uuids)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Fetch a batch of cafes by id, newest first.
    ///
    /// # Errors
    ///
    /// Returns `Database` on query failure or `DataCorruption` for
    /// undecodable rows.
    pub async fn by_ids(&self, ids: &[CafeId]) -> Result<Vec<Cafe>, RepositoryError> {
        let uuids: Vec<Uuid> = ids.iter().map(CafeId::as_uuid).collect();
        let sql = format!(
            "SELECT {CAFE_COLUMNS} FROM cafes WHERE id = ANY($1) ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, CafeRow>(&sql)
            .bind(&uuids)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(Cafe::try_from).collect()
    }

    /// Leaderboard cafes ranked by the chosen metric, highest value first.
    ///
    /// Only active cafes with at least one measured download qualify.
    ///
    /// # Errors
    ///
    /// Returns `Database` on query failure or `DataCorruption` for
    /// undecodable rows.
    pub async fn leaderboard(
        &self,
        metric: SpeedMetric,
        limit: i64,
    ) -> Result<Vec<Cafe>, RepositoryError> {
        let column = match metric {
            SpeedMetric::Download => "wifi_download",
            SpeedMetric::Upload => "wifi_upload",
            SpeedMetric::Ping => "wifi_ping",
        };
        let sql = format!(
            "SELECT {CAFE_COLUMNS} FROM cafes \
             WHERE is_active AND wifi_download > 0 \
             ORDER BY {column} DESC NULLS LAST LIMIT $1"
        );
        let rows = sqlx::query_as::<_, CafeRow>(&sql)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(Cafe::try_from).collect()
    }

    /// Directory-wide statistics.
    ///
    /// # Errors
    ///
    /// Returns `Database` on query failure.
    pub async fn stats(&self) -> Result<CafeStats, RepositoryError> {
        let (total_cafes, recent_cafes): (i64, i64) = sqlx::query_as(
            r"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE created_at >= NOW() - INTERVAL '30 days')
            FROM cafes
            ",
        )
        .fetch_one(self.pool)
        .await?;

        let top_locations = sqlx::query_as::<_, LocationCount>(
            r"
            SELECT SPLIT_PART(address, ' ', 1) AS area, COUNT(*) AS count
            FROM cafes
            GROUP BY area
            ORDER BY count DESC
            LIMIT 5
            ",
        )
        .fetch_all(self.pool)
        .await?;

        #[allow(clippy::cast_precision_loss)] // Cafe counts stay far below f64 precision
        let average_per_day = ((total_cafes as f64 / 30.0) * 10.0).round() / 10.0;

        Ok(CafeStats {
            total_cafes,
            recent_cafes,
            top_locations,
            average_per_day,
        })
    }

    /// Cafes a user added, optionally only those created after `since`.
    ///
    /// # Errors
    ///
    /// Returns `Database` on query failure or `DataCorruption` for
    /// undecodable rows.
    pub async fn added_by_since(
        &self,
        user_id: UserId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Cafe>, RepositoryError> {
        let sql = format!(
            "SELECT {CAFE_COLUMNS} FROM cafes \
             WHERE added_by = $1 AND ($2::timestamptz IS NULL OR created_at >= $2) \
             ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, CafeRow>(&sql)
            .bind(user_id)
            .bind(since)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(Cafe::try_from).collect()
    }

    /// Cafes containing a rating by this user.
    ///
    /// # Errors
    ///
    /// Returns `Database` on query failure or `DataCorruption` for
    /// undecodable rows.
    pub async fn rated_by(&self, user_id: UserId) -> Result<Vec<Cafe>, RepositoryError> {
        let sql = format!(
            "SELECT {CAFE_COLUMNS} FROM cafes \
             WHERE ratings @> jsonb_build_array(jsonb_build_object('userId', $1::text)) \
             ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, CafeRow>(&sql)
            .bind(user_id.to_string())
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(Cafe::try_from).collect()
    }

    /// Cafes containing a speed test submitted by this user.
    ///
    /// # Errors
    ///
    /// Returns `Database` on query failure or `DataCorruption` for
    /// undecodable rows.
    pub async fn speed_tested_by(&self, user_id: UserId) -> Result<Vec<Cafe>, RepositoryError> {
        let sql = format!(
            "SELECT {CAFE_COLUMNS} FROM cafes \
             WHERE speed_tests @> jsonb_build_array(jsonb_build_object('userId', $1::text)) \
             ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, CafeRow>(&sql)
            .bind(user_id.to_string())
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(Cafe::try_from).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_row() -> CafeRow {
        CafeRow {
            id: CafeId::new(),
            name: "Glacial Grounds".to_string(),
            address: "12 Dial-Up Lane, Snailsbury".to_string(),
            contact: 5_551_234_567,
            description: None,
            wifi_download: Some(2.5),
            wifi_upload: Some(0.8),
            wifi_ping: Some(55.0),
            wifi_last_tested: Some(Utc::now()),
            amenities: vec!["wifi".to_string(), "power-outlets".to_string()],
            hours: None,
            rating_average: 4.5,
            rating_count: 2,
            ratings: Json(Vec::new()),
            speed_tests: Json(Vec::new()),
            latitude: Some(51.5),
            longitude: Some(-0.12),
            is_active: true,
            added_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_decodes_into_domain() {
        let cafe = Cafe::try_from(sample_row()).unwrap();
        assert_eq!(cafe.amenities.len(), 2);
        assert_eq!(cafe.rating.count, 2);
        assert_eq!(cafe.wifi_speed.download, Some(2.5));
        assert!(cafe.location.is_some());
    }

    #[test]
    fn test_row_rejects_unknown_amenity() {
        let mut row = sample_row();
        row.amenities.push("ball-pit".to_string());
        let err = Cafe::try_from(row).unwrap_err();
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
    }

    #[test]
    fn test_row_rejects_negative_rating_count() {
        let mut row = sample_row();
        row.rating_count = -1;
        let err = Cafe::try_from(row).unwrap_err();
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
    }

    #[test]
    fn test_row_rejects_half_missing_coordinates() {
        let mut row = sample_row();
        row.longitude = None;
        let err = Cafe::try_from(row).unwrap_err();
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
    }

    #[test]
    fn test_sort_parse_whitelist() {
        assert_eq!(CafeSort::parse(Some("name")), CafeSort::Name);
        assert_eq!(CafeSort::parse(Some("rating")), CafeSort::Rating);
        assert_eq!(CafeSort::parse(Some("wifiSpeed")), CafeSort::WifiSpeed);
        assert_eq!(CafeSort::parse(Some("address")), CafeSort::Address);
        assert_eq!(CafeSort::parse(Some("createdAt")), CafeSort::CreatedAt);
        // Unknown keys cannot reach the SQL
        assert_eq!(
            CafeSort::parse(Some("; DROP TABLE cafes")),
            CafeSort::CreatedAt
        );
        assert_eq!(CafeSort::parse(None), CafeSort::CreatedAt);
    }

    #[test]
    fn test_sort_columns() {
        assert_eq!(CafeSort::Rating.column(), "rating_average");
        assert_eq!(CafeSort::WifiSpeed.column(), "wifi_download");
    }

    #[test]
    fn test_order_parse() {
        assert_eq!(SortOrder::parse(Some("asc")), SortOrder::Asc);
        assert_eq!(SortOrder::parse(Some("desc")), SortOrder::Desc);
        assert_eq!(SortOrder::parse(None), SortOrder::Desc);
    }

    #[test]
    fn test_search_pattern_escapes_wildcards() {
        let filter = CafeFilter {
            search: Some("50%_off".to_string()),
            ..CafeFilter::default()
        };
        assert_eq!(filter.search_pattern().unwrap(), "%50\\%\\_off%");
        assert_eq!(CafeFilter::default().search_pattern(), None);
    }
}
