//! Cafe directory handlers: listing, CRUD, ratings, and speed tests.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use cafe_wifi_core::types::{CafeId, RankBadge, SpeedMetric, SpeedQuality};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::db::{CafeFilter, CafeRepository, CafeSort, SortOrder};
use crate::error::{AppError, Result};
use crate::geo;
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::{
    CafeDto, CafeStats, NewCafe, RatingEntry, RatingSummary, SpeedTestEntry, WeeklyHours,
};
use crate::state::AppState;
use crate::validation::{self, NumberOrText, ValidationError};

use super::enforce_ip_quota;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 100;
const DEFAULT_SEARCH_RADIUS_KM: f64 = 10.0;

/// Page descriptor returned alongside paginated cafe lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_cafes: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub limit: i64,
}

impl Pagination {
    fn new(page: i64, limit: i64, total: i64) -> Self {
        let total_pages = if total == 0 { 0 } else { (total - 1) / limit + 1 };
        Self {
            current_page: page,
            total_pages,
            total_cafes: total,
            has_next_page: page < total_pages,
            has_prev_page: page > 1 && total_pages > 0,
            limit,
        }
    }
}

#[derive(Debug, Serialize)]
struct PaginatedCafes {
    cafes: Vec<CafeDto>,
    pagination: Pagination,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    search: Option<String>,
    min_rating: Option<f64>,
    max_rating: Option<f64>,
    wifi_speed_min: Option<f64>,
    wifi_speed_max: Option<f64>,
    is_active: Option<bool>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    radius: Option<f64>,
    sort_by: Option<String>,
    order: Option<String>,
    page: Option<i64>,
    limit: Option<i64>,
}

/// `GET /api/cafes` - list cafes with filters, sorting, geo search, and
/// pagination.
///
/// Legacy contract: when neither `page` nor `limit` is supplied the body is
/// a bare JSON array; otherwise `{cafes, pagination}`.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response> {
    let filter = CafeFilter {
        search: query.search.clone().filter(|term| !term.trim().is_empty()),
        min_rating: query.min_rating,
        max_rating: query.max_rating,
        min_speed: query.wifi_speed_min,
        max_speed: query.wifi_speed_max,
        is_active: Some(query.is_active.unwrap_or(true)),
        sort: CafeSort::parse(query.sort_by.as_deref()),
        order: SortOrder::parse(query.order.as_deref()),
    };

    let paginated = query.page.is_some() || query.limit.is_some();
    let page = query.page.unwrap_or(1).max(1);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let repo = CafeRepository::new(state.pool());

    if let Some(origin) = validation::coordinates(query.latitude, query.longitude)? {
        // Distances are computed in process, so the radius search fetches
        // the full filtered set and paginates afterwards.
        let radius = query.radius.unwrap_or(DEFAULT_SEARCH_RADIUS_KM).max(0.0);
        let mut nearby: Vec<CafeDto> = repo
            .list_all(&filter)
            .await?
            .into_iter()
            .filter_map(|cafe| {
                let here = cafe.location?;
                let km = geo::distance_km(origin, here);
                (km <= radius).then(|| CafeDto::from(cafe).with_distance(km))
            })
            .collect();
        nearby.sort_by(|a, b| {
            a.distance_from_user
                .partial_cmp(&b.distance_from_user)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        if !paginated {
            return Ok(Json(nearby).into_response());
        }

        let total = i64::try_from(nearby.len()).unwrap_or(i64::MAX);
        let skip = usize::try_from((page - 1) * limit).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(0);
        let cafes: Vec<CafeDto> = nearby.into_iter().skip(skip).take(take).collect();
        return Ok(Json(PaginatedCafes {
            cafes,
            pagination: Pagination::new(page, limit, total),
        })
        .into_response());
    }

    if !paginated {
        let cafes: Vec<CafeDto> = repo
            .list_all(&filter)
            .await?
            .into_iter()
            .map(CafeDto::from)
            .collect();
        return Ok(Json(cafes).into_response());
    }

    let total = repo.count(&filter).await?;
    let cafes: Vec<CafeDto> = repo
        .list(&filter, limit, (page - 1) * limit)
        .await?
        .into_iter()
        .map(CafeDto::from)
        .collect();
    Ok(Json(PaginatedCafes {
        cafes,
        pagination: Pagination::new(page, limit, total),
    })
    .into_response())
}

#[derive(Debug, Serialize)]
pub struct CafeEnvelope {
    cafe: CafeDto,
}

/// `GET /api/cafes/{id}` - one cafe by id.
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CafeEnvelope>> {
    let id: CafeId = id.parse()?;
    let cafe = CafeRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cafe not found".to_string()))?;
    Ok(Json(CafeEnvelope { cafe: cafe.into() }))
}

#[derive(Debug, Serialize)]
pub struct StatsEnvelope {
    stats: CafeStats,
}

/// `GET /api/cafes/stats` - directory statistics, cached for a minute.
pub async fn stats(State(state): State<AppState>) -> Result<Json<StatsEnvelope>> {
    if let Some(stats) = state.stats_cache().get(&()).await {
        return Ok(Json(StatsEnvelope { stats }));
    }

    let stats = CafeRepository::new(state.pool()).stats().await?;
    state.stats_cache().insert((), stats.clone()).await;
    Ok(Json(StatsEnvelope { stats }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCafeBody {
    name: String,
    address: String,
    contact: NumberOrText,
    description: Option<String>,
    #[serde(default)]
    amenities: Vec<String>,
    hours: Option<WeeklyHours>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

/// `POST /api/cafes` - add a cafe.
pub async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateCafeBody>,
) -> Result<(StatusCode, Json<CafeDto>)> {
    enforce_ip_quota(&state, &headers).await?;

    let name = validation::cafe_name(&body.name)?;
    let address = validation::cafe_address(&body.address)?;
    let contact = validation::contact_number(&body.contact)?;
    let description = validation::description(body.description.as_deref())?;
    let amenities = validation::amenities(&body.amenities)?;
    let location = validation::coordinates(body.latitude, body.longitude)?;

    let repo = CafeRepository::new(state.pool());
    if repo.find_duplicate(&name, &address, None).await? {
        return Err(AppError::Conflict(
            "A cafe with this name and address already exists".to_string(),
        ));
    }

    let cafe = repo
        .create(&NewCafe {
            name,
            address,
            contact,
            description,
            amenities,
            hours: body.hours,
            location,
            added_by: Some(user.id),
        })
        .await?;

    tracing::info!(cafe_id = %cafe.id, user_id = %user.id, "cafe created");
    Ok((StatusCode::CREATED, Json(cafe.into())))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCafeBody {
    #[serde(rename = "_id")]
    id: Option<String>,
    name: Option<String>,
    address: Option<String>,
    contact: Option<NumberOrText>,
    description: Option<String>,
    amenities: Option<Vec<String>>,
    hours: Option<WeeklyHours>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    is_active: Option<bool>,
}

/// `PUT /api/cafes` - update a cafe. The id travels in the body as `_id`
/// (legacy contract).
pub async fn update(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<UpdateCafeBody>,
) -> Result<Json<CafeDto>> {
    enforce_ip_quota(&state, &headers).await?;

    let id: CafeId = body
        .id
        .as_deref()
        .ok_or(ValidationError::CafeIdRequired)?
        .parse()?;

    let repo = CafeRepository::new(state.pool());
    let mut cafe = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cafe not found".to_string()))?;

    if let Some(raw) = body.name.as_deref() {
        cafe.name = validation::cafe_name(raw)?;
    }
    if let Some(raw) = body.address.as_deref() {
        cafe.address = validation::cafe_address(raw)?;
    }
    if (body.name.is_some() || body.address.is_some())
        && repo
            .find_duplicate(&cafe.name, &cafe.address, Some(id))
            .await?
    {
        return Err(AppError::Conflict(
            "Another cafe with this name and address already exists".to_string(),
        ));
    }
    if let Some(raw) = body.contact.as_ref() {
        cafe.contact = validation::contact_number(raw)?;
    }
    if body.description.is_some() {
        cafe.description = validation::description(body.description.as_deref())?;
    }
    if let Some(raw) = body.amenities.as_deref() {
        cafe.amenities = validation::amenities(raw)?;
    }
    if let Some(hours) = body.hours {
        cafe.hours = Some(hours);
    }
    if body.latitude.is_some() || body.longitude.is_some() {
        cafe.location = validation::coordinates(body.latitude, body.longitude)?;
    }
    if let Some(is_active) = body.is_active {
        cafe.is_active = is_active;
    }

    let updated = repo.update_details(&cafe).await?;
    Ok(Json(updated.into()))
}

#[derive(Debug, Deserialize)]
pub struct DeleteCafeBody {
    #[serde(rename = "_id")]
    id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedCafe {
    id: CafeId,
    name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    message: &'static str,
    deleted_cafe: DeletedCafe,
}

/// `DELETE /api/cafes` - delete a cafe by the `_id` in the body.
pub async fn remove(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<DeleteCafeBody>,
) -> Result<Json<DeleteResponse>> {
    enforce_ip_quota(&state, &headers).await?;

    let id: CafeId = body
        .id
        .as_deref()
        .ok_or(ValidationError::CafeIdRequired)?
        .parse()?;

    let cafe = CafeRepository::new(state.pool())
        .delete(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cafe not found".to_string()))?;

    tracing::info!(cafe_id = %id, user_id = %user.id, "cafe deleted");
    Ok(Json(DeleteResponse {
        message: "Cafe deleted successfully",
        deleted_cafe: DeletedCafe {
            id: cafe.id,
            name: cafe.name,
        },
    }))
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteBody {
    ids: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteResponse {
    deleted_count: u64,
    message: String,
}

/// `DELETE /api/cafes/bulk` - delete a batch of cafes. Admin key only.
pub async fn bulk_delete(
    admin: RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<BulkDeleteBody>,
) -> Result<Json<BulkDeleteResponse>> {
    let raw_ids = body
        .ids
        .filter(|ids| !ids.is_empty())
        .ok_or(ValidationError::IdsRequired)?;
    let ids: Vec<CafeId> = raw_ids
        .iter()
        .map(|raw| raw.parse())
        .collect::<std::result::Result<_, _>>()?;

    let deleted_count = CafeRepository::new(state.pool()).delete_many(&ids).await?;
    tracing::info!(deleted_count, admin_level = admin.level, "bulk delete");

    Ok(Json(BulkDeleteResponse {
        deleted_count,
        message: format!("{deleted_count} cafes deleted"),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateBody {
    cafe_id: Option<String>,
    rating: Option<f64>,
    review: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RatedCafe {
    id: CafeId,
    name: String,
    rating: RatingSummary,
}

#[derive(Debug, Serialize)]
pub struct RateResponse {
    message: &'static str,
    cafe: RatedCafe,
}

/// `POST /api/cafes/rate` - add or replace the caller's rating.
pub async fn rate(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<RateBody>,
) -> Result<Json<RateResponse>> {
    let id: CafeId = body
        .cafe_id
        .as_deref()
        .ok_or(ValidationError::CafeIdRequired)?
        .parse()?;
    let rating = validation::rating_value(body.rating)?;
    let review = validation::review(body.review.as_deref())?;

    let repo = CafeRepository::new(state.pool());
    let mut cafe = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cafe not found".to_string()))?;

    cafe.apply_rating(user.id, rating, review);
    repo.update_ratings(id, &cafe.ratings, cafe.rating).await?;

    Ok(Json(RateResponse {
        message: "Rating submitted successfully",
        cafe: RatedCafe {
            id: cafe.id,
            name: cafe.name,
            rating: cafe.rating,
        },
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedTestBody {
    cafe_id: Option<String>,
    download: Option<f64>,
    upload: Option<f64>,
    ping: Option<f64>,
    device_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedTestResponse {
    message: &'static str,
    cafe: CafeDto,
    is_slow_wifi: bool,
}

/// `POST /api/cafes/speed-test` - record a manually measured speed test,
/// attributed to the authenticated user.
pub async fn submit_speed_test(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<SpeedTestBody>,
) -> Result<Json<SpeedTestResponse>> {
    let id: CafeId = body
        .cafe_id
        .as_deref()
        .ok_or(ValidationError::CafeIdRequired)?
        .parse()?;
    let download = validation::download_speed(body.download)?;
    let upload = validation::optional_speed(body.upload, "Upload speed")?;
    let ping = validation::optional_speed(body.ping, "Ping")?;

    let repo = CafeRepository::new(state.pool());
    let mut cafe = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cafe not found".to_string()))?;

    cafe.record_speed_test(SpeedTestEntry {
        user_id: Some(user.id),
        download,
        upload,
        ping,
        device_type: body
            .device_type
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| "unknown".to_string()),
        timestamp: Utc::now(),
    });
    repo.update_speed_tests(id, &cafe.speed_tests, &cafe.wifi_speed)
        .await?;

    let is_slow_wifi = cafe.is_slow_wifi();
    Ok(Json(SpeedTestResponse {
        message: "Speed test recorded successfully",
        cafe: cafe.into(),
        is_slow_wifi,
    }))
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    limit: Option<i64>,
    metric: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardEntry {
    rank: usize,
    badge: RankBadge,
    id: CafeId,
    name: String,
    address: String,
    /// The ranked metric's current value; 0 when unmeasured.
    speed: f64,
    rating: RatingSummary,
    quality: SpeedQuality,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    #[serde(rename = "type")]
    metric: SpeedMetric,
    leaderboard: Vec<LeaderboardEntry>,
}

/// `GET /api/cafes/leaderboard` - cafes ranked by a speed metric, highest
/// value first.
pub async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>> {
    let metric = match query.metric.as_deref() {
        None => SpeedMetric::Download,
        Some(raw) => raw.parse().map_err(|_| {
            AppError::BadRequest("Invalid metric. Use download, upload, or ping".to_string())
        })?,
    };
    let limit = query.limit.unwrap_or(10).clamp(1, 50);

    let cafes = CafeRepository::new(state.pool())
        .leaderboard(metric, limit)
        .await?;
    let leaderboard = cafes
        .into_iter()
        .enumerate()
        .map(|(index, cafe)| {
            let rank = index + 1;
            let speed = match metric {
                SpeedMetric::Download => cafe.wifi_speed.download,
                SpeedMetric::Upload => cafe.wifi_speed.upload,
                SpeedMetric::Ping => cafe.wifi_speed.ping,
            }
            .unwrap_or(0.0);
            LeaderboardEntry {
                rank,
                badge: RankBadge::for_rank(rank),
                id: cafe.id,
                name: cafe.name,
                address: cafe.address,
                speed,
                rating: cafe.rating,
                quality: SpeedQuality::from_download_mbps(cafe.wifi_speed.download.unwrap_or(0.0)),
            }
        })
        .collect();

    Ok(Json(LeaderboardResponse {
        metric,
        leaderboard,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ReviewsQuery {
    page: Option<i64>,
    limit: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewsPagination {
    current_page: i64,
    total_pages: i64,
    total_reviews: i64,
    has_next_page: bool,
    has_prev_page: bool,
    limit: i64,
}

#[derive(Debug, Serialize)]
pub struct ReviewsResponse {
    cafe: RatedCafe,
    reviews: Vec<RatingEntry>,
    pagination: ReviewsPagination,
}

/// `GET /api/cafes/{id}/reviews` - the cafe's ratings, newest first.
pub async fn reviews(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ReviewsQuery>,
) -> Result<Json<ReviewsResponse>> {
    let id: CafeId = id.parse()?;
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).clamp(1, 50);

    let cafe = CafeRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cafe not found".to_string()))?;

    let mut entries = cafe.ratings;
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let total = i64::try_from(entries.len()).unwrap_or(i64::MAX);
    let total_pages = if total == 0 { 0 } else { (total - 1) / limit + 1 };
    let skip = usize::try_from((page - 1) * limit).unwrap_or(usize::MAX);
    let take = usize::try_from(limit).unwrap_or(0);
    let reviews: Vec<RatingEntry> = entries.into_iter().skip(skip).take(take).collect();

    Ok(Json(ReviewsResponse {
        cafe: RatedCafe {
            id: cafe.id,
            name: cafe.name,
            rating: cafe.rating,
        },
        reviews,
        pagination: ReviewsPagination {
            current_page: page,
            total_pages,
            total_reviews: total,
            has_next_page: page < total_pages,
            has_prev_page: page > 1 && total_pages > 0,
            limit,
        },
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_math() {
        let p = Pagination::new(1, 50, 120);
        assert_eq!(p.total_pages, 3);
        assert!(p.has_next_page);
        assert!(!p.has_prev_page);

        let p = Pagination::new(3, 50, 120);
        assert!(!p.has_next_page);
        assert!(p.has_prev_page);
    }

    #[test]
    fn test_pagination_empty_directory() {
        let p = Pagination::new(1, 50, 0);
        assert_eq!(p.total_pages, 0);
        assert!(!p.has_next_page);
        assert!(!p.has_prev_page);
    }

    #[test]
    fn test_pagination_exact_multiple() {
        let p = Pagination::new(2, 10, 20);
        assert_eq!(p.total_pages, 2);
        assert!(!p.has_next_page);
        assert!(p.has_prev_page);
    }

    #[test]
    fn test_list_query_accepts_camel_case_params() {
        let query: ListQuery = serde_json::from_str(
            r#"{"search":"slow","minRating":2,"wifiSpeedMax":5,"sortBy":"rating","isActive":false,"page":2}"#,
        )
        .unwrap();
        assert_eq!(query.search.as_deref(), Some("slow"));
        assert_eq!(query.min_rating, Some(2.0));
        assert_eq!(query.wifi_speed_max, Some(5.0));
        assert_eq!(query.sort_by.as_deref(), Some("rating"));
        assert_eq!(query.is_active, Some(false));
        assert_eq!(query.page, Some(2));
        assert_eq!(query.limit, None);
    }

    #[test]
    fn test_update_body_takes_underscore_id() {
        let body: UpdateCafeBody =
            serde_json::from_str(r#"{"_id":"not-checked-here","isActive":false}"#).unwrap();
        assert_eq!(body.id.as_deref(), Some("not-checked-here"));
        assert_eq!(body.is_active, Some(false));
        assert!(body.name.is_none());
    }
}
