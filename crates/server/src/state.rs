//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::models::CafeStats;
use crate::services::rate_limit::RateLimiter;
use crate::services::{SpeedTestClient, TokenSigner};

/// How long the directory statistics stay cached.
const STATS_CACHE_TTL: Duration = Duration::from_secs(60);

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    tokens: TokenSigner,
    limiter: RateLimiter,
    speedtest: SpeedTestClient,
    stats_cache: Cache<(), CafeStats>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `pool` - `PostgreSQL` connection pool
    /// * `speedtest` - Speed-test runner, real or simulated
    #[must_use]
    pub fn new(config: ServerConfig, pool: PgPool, speedtest: SpeedTestClient) -> Self {
        let tokens = TokenSigner::new(&config.jwt_secret);
        let stats_cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(STATS_CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                tokens,
                limiter: RateLimiter::in_memory(),
                speedtest,
                stats_cache,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the token signer.
    #[must_use]
    pub fn tokens(&self) -> &TokenSigner {
        &self.inner.tokens
    }

    /// Get a reference to the shared rate limiter.
    #[must_use]
    pub fn limiter(&self) -> &RateLimiter {
        &self.inner.limiter
    }

    /// Get a reference to the speed-test runner.
    #[must_use]
    pub fn speedtest(&self) -> &SpeedTestClient {
        &self.inner.speedtest
    }

    /// Get the cached directory statistics slot.
    #[must_use]
    pub fn stats_cache(&self) -> &Cache<(), CafeStats> {
        &self.inner.stats_cache
    }
}
