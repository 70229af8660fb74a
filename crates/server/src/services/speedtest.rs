//! Wifi speed measurement.
//!
//! With a fast.com API token configured the client downloads one payload
//! from the provider and derives the remaining numbers from the measured
//! rate. Without a token, or whenever the provider call fails, it falls
//! back to fully simulated results in this directory's typical ranges.
//! `run` therefore never fails.

use std::time::{Duration, Instant};

use cafe_wifi_core::types::{SpeedQuality, round2, speed_recommendation};
use chrono::{DateTime, Utc};
use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const PROVIDER_URL: &str = "https://api.fast.com/netflix/speedtest/v2";
const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// One completed measurement, real or simulated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedTestResults {
    pub download: f64,
    pub upload: f64,
    pub ping: f64,
    pub jitter: f64,
    pub test_timestamp: DateTime<Utc>,
    pub simulated: bool,
}

impl SpeedTestResults {
    /// Quality tier for the measured download speed.
    #[must_use]
    pub fn quality(&self) -> SpeedQuality {
        SpeedQuality::from_download_mbps(self.download)
    }

    /// Human-readable suggestion for what the connection can handle.
    #[must_use]
    pub fn recommendation(&self) -> &'static str {
        speed_recommendation(self.download, self.ping)
    }
}

#[derive(Debug, Error)]
enum ProviderError {
    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned no download targets")]
    NoTargets,
}

#[derive(Debug, Deserialize)]
struct TargetList {
    targets: Vec<Target>,
}

#[derive(Debug, Deserialize)]
struct Target {
    url: String,
}

/// Speed-test runner shared across handlers.
#[derive(Clone)]
pub struct SpeedTestClient {
    http: reqwest::Client,
    token: Option<SecretString>,
}

impl SpeedTestClient {
    /// Build the client. Provider calls are only attempted when `token`
    /// is present.
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the HTTP client cannot be constructed.
    pub fn new(token: Option<SecretString>) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(PROVIDER_TIMEOUT)
            .build()?;
        Ok(Self { http, token })
    }

    /// Run one speed test.
    ///
    /// Falls back to simulated results when no token is configured or the
    /// provider call fails, so this always produces a measurement.
    pub async fn run(&self) -> SpeedTestResults {
        let Some(token) = self.token.as_ref() else {
            return simulated();
        };

        match self.measure_download(token).await {
            Ok(download) => provider_results(download),
            Err(error) => {
                tracing::warn!(%error, "speed test provider failed, using simulated results");
                simulated()
            }
        }
    }

    /// Fetch one provider payload and compute the download rate in Mbps.
    async fn measure_download(&self, token: &SecretString) -> Result<f64, ProviderError> {
        let target_list: TargetList = self
            .http
            .get(PROVIDER_URL)
            .query(&[
                ("https", "true"),
                ("urlCount", "1"),
                ("token", token.expose_secret()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let target = target_list
            .targets
            .into_iter()
            .next()
            .ok_or(ProviderError::NoTargets)?;

        let started = Instant::now();
        let body = self
            .http
            .get(&target.url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        let secs = started.elapsed().as_secs_f64().max(0.001);

        #[allow(clippy::cast_precision_loss)] // Payload sizes stay far below f64 precision
        let bits = (body.len() * 8) as f64;
        Ok(round2(bits / secs / 1_000_000.0))
    }
}

/// Results derived from one measured download rate.
fn provider_results(download: f64) -> SpeedTestResults {
    let mut rng = rand::rng();
    SpeedTestResults {
        download,
        upload: round2(download * 0.3 + rng.random_range(0.0..2.0)),
        ping: f64::from(rng.random_range(10..=60)),
        jitter: f64::from(rng.random_range(1..=11)),
        test_timestamp: Utc::now(),
        simulated: false,
    }
}

/// Fully simulated results in this directory's typical ranges.
fn simulated() -> SpeedTestResults {
    let mut rng = rand::rng();
    SpeedTestResults {
        download: round2(rng.random_range(1.0..11.0)),
        upload: round2(rng.random_range(0.5..5.5)),
        ping: f64::from(rng.random_range(10..=60)),
        jitter: f64::from(rng.random_range(1..=11)),
        test_timestamp: Utc::now(),
        simulated: true,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_results_stay_in_range() {
        for _ in 0..200 {
            let results = simulated();
            assert!(results.simulated);
            assert!((1.0..11.0).contains(&results.download), "{results:?}");
            assert!((0.5..5.5).contains(&results.upload), "{results:?}");
            assert!((10.0..=60.0).contains(&results.ping), "{results:?}");
            assert!((1.0..=11.0).contains(&results.jitter), "{results:?}");
            assert!((results.ping.fract() - 0.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_provider_results_derive_upload_from_download() {
        for _ in 0..200 {
            let results = provider_results(20.0);
            assert!(!results.simulated);
            assert!((results.download - 20.0).abs() < f64::EPSILON);
            // upload = download * 0.3 + [0, 2)
            assert!((6.0..8.0).contains(&results.upload), "{results:?}");
        }
    }

    #[test]
    fn test_quality_and_recommendation_follow_download() {
        let results = SpeedTestResults {
            download: 2.5,
            upload: 1.0,
            ping: 45.0,
            jitter: 3.0,
            test_timestamp: Utc::now(),
            simulated: true,
        };
        assert_eq!(results.quality(), SpeedQuality::Slow);
        assert_eq!(
            results.recommendation(),
            speed_recommendation(2.5, 45.0)
        );
    }

    #[test]
    fn test_results_serialize_camel_case() {
        let results = simulated();
        let json = serde_json::to_value(results).unwrap();
        assert!(json.get("testTimestamp").is_some());
        assert!(json.get("simulated").is_some());
    }

    #[tokio::test]
    async fn test_run_without_token_is_simulated() {
        let client = SpeedTestClient::new(None).unwrap();
        let results = client.run().await;
        assert!(results.simulated);
    }
}
