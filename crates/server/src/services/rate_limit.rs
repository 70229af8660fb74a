//! Fixed-window rate limiting.
//!
//! Callers name a scope (`ip:…`, `auth:…`, `admin:…`) and its quota;
//! the store counts hits per key inside a window that resets wholesale
//! when it expires. Every decision reports the remaining allowance and
//! the reset instant so handlers can surface `retryAfter`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;

/// All quotas share the same fifteen-minute window.
pub const WINDOW_SECS: i64 = 15 * 60;

/// Per-IP quota for anonymous traffic on signup and login.
pub const DEFAULT_QUOTA: Quota = Quota {
    max_requests: 10,
    window_secs: WINDOW_SECS,
};

/// Per-IP quota for token-authenticated requests.
pub const AUTH_QUOTA: Quota = Quota {
    max_requests: 100,
    window_secs: WINDOW_SECS,
};

/// Per-IP quota for admin key verification attempts.
pub const ADMIN_QUOTA: Quota = Quota {
    max_requests: 5,
    window_secs: WINDOW_SECS,
};

/// A request allowance over a fixed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    pub max_requests: u32,
    pub window_secs: i64,
}

/// Outcome of counting one request against a quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Requests left in the window after this one.
    pub remaining: u32,
    /// When the window rolls over and the count restarts.
    pub reset_time: DateTime<Utc>,
}

impl RateLimitDecision {
    /// Whole seconds until the window resets, rounded up, never negative.
    #[must_use]
    pub fn retry_after_secs(&self) -> i64 {
        let millis = (self.reset_time - Utc::now()).num_milliseconds();
        if millis <= 0 { 0 } else { (millis - 1) / 1000 + 1 }
    }
}

/// Counting backend for the limiter.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Count one hit for `key` and decide whether it fits the quota.
    async fn hit(&self, key: &str, quota: Quota) -> RateLimitDecision;
}

#[derive(Debug, Clone, Copy)]
struct Bucket {
    count: u32,
    reset_at: DateTime<Utc>,
}

/// Process-local store backed by a concurrent map.
///
/// Counts reset on restart and are not shared across instances; the
/// single-process deployment this serves does not need more.
#[derive(Debug, Default)]
pub struct InMemoryRateLimitStore {
    buckets: DashMap<String, Bucket>,
}

impl InMemoryRateLimitStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn hit(&self, key: &str, quota: Quota) -> RateLimitDecision {
        let now = Utc::now();
        let mut bucket = self.buckets.entry(key.to_string()).or_insert(Bucket {
            count: 0,
            reset_at: now + TimeDelta::seconds(quota.window_secs),
        });

        if now > bucket.reset_at {
            bucket.count = 0;
            bucket.reset_at = now + TimeDelta::seconds(quota.window_secs);
        }

        if bucket.count >= quota.max_requests {
            return RateLimitDecision {
                allowed: false,
                remaining: 0,
                reset_time: bucket.reset_at,
            };
        }

        bucket.count += 1;
        RateLimitDecision {
            allowed: true,
            remaining: quota.max_requests - bucket.count,
            reset_time: bucket.reset_at,
        }
    }
}

/// Handle shared across handlers and extractors.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
}

impl RateLimiter {
    /// Limiter backed by the in-process store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(InMemoryRateLimitStore::new()),
        }
    }

    /// Limiter backed by a caller-provided store.
    #[must_use]
    pub fn with_store(store: Arc<dyn RateLimitStore>) -> Self {
        Self { store }
    }

    /// Count one request for `key` against `quota`.
    pub async fn check(&self, key: &str, quota: Quota) -> RateLimitDecision {
        self.store.hit(key, quota).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const TIGHT: Quota = Quota {
        max_requests: 3,
        window_secs: 60,
    };

    #[tokio::test]
    async fn test_allows_up_to_quota_then_denies() {
        let limiter = RateLimiter::in_memory();

        for expected_remaining in [2, 1, 0] {
            let decision = limiter.check("ip:1.2.3.4", TIGHT).await;
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
        }

        let denied = limiter.check("ip:1.2.3.4", TIGHT).await;
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
    }

    #[tokio::test]
    async fn test_keys_are_isolated() {
        let limiter = RateLimiter::in_memory();

        for _ in 0..3 {
            limiter.check("ip:1.2.3.4", TIGHT).await;
        }
        assert!(!limiter.check("ip:1.2.3.4", TIGHT).await.allowed);
        assert!(limiter.check("ip:5.6.7.8", TIGHT).await.allowed);
    }

    #[tokio::test]
    async fn test_scopes_do_not_share_buckets() {
        let limiter = RateLimiter::in_memory();

        for _ in 0..3 {
            limiter.check("admin:1.2.3.4", TIGHT).await;
        }
        assert!(!limiter.check("admin:1.2.3.4", TIGHT).await.allowed);
        assert!(limiter.check("auth:1.2.3.4", TIGHT).await.allowed);
    }

    #[tokio::test]
    async fn test_window_rollover_restores_allowance() {
        let instant = Quota {
            max_requests: 1,
            window_secs: 0,
        };
        let limiter = RateLimiter::in_memory();

        assert!(limiter.check("ip:9.9.9.9", instant).await.allowed);
        // Zero-second window expires immediately
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        assert!(limiter.check("ip:9.9.9.9", instant).await.allowed);
    }

    #[tokio::test]
    async fn test_denied_decision_reports_reset_time() {
        let limiter = RateLimiter::in_memory();
        let one = Quota {
            max_requests: 1,
            window_secs: 60,
        };

        limiter.check("ip:8.8.8.8", one).await;
        let denied = limiter.check("ip:8.8.8.8", one).await;

        assert!(!denied.allowed);
        assert!(denied.reset_time > Utc::now());
        let retry = denied.retry_after_secs();
        assert!(retry > 0 && retry <= 60, "got {retry}");
    }

    #[test]
    fn test_retry_after_never_negative() {
        let decision = RateLimitDecision {
            allowed: false,
            remaining: 0,
            reset_time: Utc::now() - TimeDelta::seconds(10),
        };
        assert_eq!(decision.retry_after_secs(), 0);
    }
}
