//! Speed-test handlers: on-demand runs, per-cafe history, and comparison.

use axum::Json;
use axum::extract::{Path, Query, State};
use cafe_wifi_core::types::{CafeId, SpeedQuality, wifi};
use chrono::{TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::db::CafeRepository;
use crate::error::{AppError, Result};
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::{SpeedTestEntry, WifiSpeed};
use crate::services::speedtest::SpeedTestResults;
use crate::state::AppState;
use crate::validation::ValidationError;

/// A measurement annotated with its quality tier and a human label.
#[derive(Debug, Serialize)]
pub struct AnnotatedResults {
    #[serde(flatten)]
    results: SpeedTestResults,
    quality: SpeedQuality,
    recommendation: &'static str,
}

impl From<SpeedTestResults> for AnnotatedResults {
    fn from(results: SpeedTestResults) -> Self {
        Self {
            quality: results.quality(),
            recommendation: results.recommendation(),
            results,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QuickResponse {
    results: AnnotatedResults,
}

/// `GET /api/speedtest/quick` - run a measurement without persisting it.
pub async fn quick(State(state): State<AppState>) -> Json<QuickResponse> {
    let results = state.speedtest().run().await;
    Json(QuickResponse {
        results: results.into(),
    })
}

#[derive(Debug, Serialize)]
pub struct CafeRef {
    id: CafeId,
    name: String,
}

#[derive(Debug, Serialize)]
pub struct RunResponse {
    message: &'static str,
    cafe: CafeRef,
    results: AnnotatedResults,
}

/// `POST /api/speedtest/run/{id}` - run a measurement and record it as the
/// cafe's current wifi speed.
pub async fn run_for_cafe(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RunResponse>> {
    let id: CafeId = id.parse()?;

    let repo = CafeRepository::new(state.pool());
    let mut cafe = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cafe not found".to_string()))?;

    let results = state.speedtest().run().await;
    cafe.record_speed_test(SpeedTestEntry {
        user_id: Some(user.id),
        download: results.download,
        upload: results.upload,
        ping: results.ping,
        device_type: "server".to_string(),
        timestamp: results.test_timestamp,
    });
    repo.update_speed_tests(id, &cafe.speed_tests, &cafe.wifi_speed)
        .await?;

    tracing::info!(cafe_id = %id, download = results.download, simulated = results.simulated, "speed test recorded");
    Ok(Json(RunResponse {
        message: "Speed test completed and recorded",
        cafe: CafeRef {
            id: cafe.id,
            name: cafe.name,
        },
        results: results.into(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    days: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    cafe: CafeRef,
    current_speed: WifiSpeed,
    count: usize,
    history: Vec<SpeedTestEntry>,
}

/// `GET /api/speedtest/history/{id}` - recorded tests within a window
/// (`days`, default 30, max 90), newest first.
pub async fn history(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>> {
    let id: CafeId = id.parse()?;
    let days = query.days.unwrap_or(30).clamp(1, 90);
    let since = Utc::now() - TimeDelta::days(days);

    let cafe = CafeRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cafe not found".to_string()))?;

    let mut history: Vec<SpeedTestEntry> = cafe
        .speed_tests
        .into_iter()
        .filter(|entry| entry.timestamp >= since)
        .collect();
    history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    Ok(Json(HistoryResponse {
        cafe: CafeRef {
            id: cafe.id,
            name: cafe.name,
        },
        current_speed: cafe.wifi_speed,
        count: history.len(),
        history,
    }))
}

const COMPARE_MAX_CAFES: usize = 10;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareBody {
    cafe_ids: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonEntry {
    id: CafeId,
    name: String,
    address: String,
    download: f64,
    upload: f64,
    ping: f64,
    average_speed: f64,
    quality: SpeedQuality,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSummary {
    fastest: Option<String>,
    slowest: Option<String>,
    average_download: f64,
}

#[derive(Debug, Serialize)]
pub struct CompareResponse {
    comparison: Vec<ComparisonEntry>,
    summary: ComparisonSummary,
    count: usize,
}

/// `POST /api/speedtest/compare` - side-by-side wifi speeds for up to ten
/// cafes, sorted fastest first.
pub async fn compare(
    OptionalAuth(_user): OptionalAuth,
    State(state): State<AppState>,
    Json(body): Json<CompareBody>,
) -> Result<Json<CompareResponse>> {
    let raw_ids = body
        .cafe_ids
        .filter(|ids| !ids.is_empty() && ids.len() <= COMPARE_MAX_CAFES)
        .ok_or(ValidationError::CompareCount)?;
    let ids: Vec<CafeId> = raw_ids
        .iter()
        .map(|raw| raw.parse())
        .collect::<std::result::Result<_, _>>()?;

    let cafes = CafeRepository::new(state.pool()).by_ids(&ids).await?;

    let mut comparison: Vec<ComparisonEntry> = cafes
        .into_iter()
        .map(|cafe| {
            let download = cafe.wifi_speed.download.unwrap_or(0.0);
            ComparisonEntry {
                id: cafe.id,
                average_speed: cafe.average_wifi_speed(),
                download,
                upload: cafe.wifi_speed.upload.unwrap_or(0.0),
                ping: cafe.wifi_speed.ping.unwrap_or(0.0),
                quality: SpeedQuality::from_download_mbps(download),
                name: cafe.name,
                address: cafe.address,
            }
        })
        .collect();
    comparison.sort_by(|a, b| b.average_speed.total_cmp(&a.average_speed));

    let average_download = if comparison.is_empty() {
        0.0
    } else {
        let sum: f64 = comparison.iter().map(|entry| entry.download).sum();
        #[allow(clippy::cast_precision_loss)]
        let mean = sum / comparison.len() as f64;
        wifi::round2(mean)
    };
    let summary = ComparisonSummary {
        fastest: comparison.first().map(|entry| entry.name.clone()),
        slowest: comparison.last().map(|entry| entry.name.clone()),
        average_download,
    };
    let count = comparison.len();

    Ok(Json(CompareResponse {
        comparison,
        summary,
        count,
    }))
}
