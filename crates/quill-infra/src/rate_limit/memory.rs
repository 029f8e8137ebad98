//! In-memory keyed rate limiter using governor crate.

use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::{Clock, DefaultClock};
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter as GovernorRateLimiter};

use quill_core::ports::{RateLimitError, RateLimitResult, RateLimiter};

type KeyedRateLimiter = GovernorRateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Idle keys are swept after this many checks.
const PRUNE_EVERY: u64 = 1024;

/// Rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: u32,
    /// Window duration.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 20,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    /// Read the AI endpoint budget from `AI_RATE_LIMIT_*`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_requests: std::env::var("AI_RATE_LIMIT_MAX_REQUESTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_requests),
            window: std::env::var("AI_RATE_LIMIT_WINDOW_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.window),
        }
    }

    fn quota(&self) -> Quota {
        let burst = NonZeroU32::new(self.max_requests).unwrap_or(NonZeroU32::MIN);
        let period = (self.window / burst.get()).max(Duration::from_nanos(1));
        Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst)
    }
}

/// Per-key GCRA limiter. Each caller (user id or client address) gets its
/// own bucket; limits are per-process, not shared across instances.
/// Buckets that have fully refilled are dropped periodically so the key
/// store stays bounded by the callers active within one window.
pub struct InMemoryRateLimiter {
    limiter: KeyedRateLimiter,
    clock: DefaultClock,
    checks: AtomicU64,
    prune_every: u64,
}

impl InMemoryRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            limiter: KeyedRateLimiter::keyed(config.quota()),
            clock: DefaultClock::default(),
            checks: AtomicU64::new(0),
            prune_every: PRUNE_EVERY,
        }
    }

    pub fn from_env() -> Self {
        Self::new(RateLimitConfig::from_env())
    }

    /// Number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.limiter.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limiter.is_empty()
    }

    /// Forget keys whose bucket is indistinguishable from a fresh one.
    pub fn prune(&self) {
        let before = self.limiter.len();
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        let removed = before.saturating_sub(self.limiter.len());
        if removed > 0 {
            tracing::debug!(removed, remaining = self.limiter.len(), "Pruned idle rate limit keys");
        }
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check(&self, key: &str) -> Result<RateLimitResult, RateLimitError> {
        let n = self.checks.fetch_add(1, Ordering::Relaxed) + 1;
        if n % self.prune_every == 0 {
            self.prune();
        }

        match self.limiter.check_key(&key.to_string()) {
            Ok(_) => Ok(RateLimitResult {
                allowed: true,
                reset_after: Duration::ZERO,
            }),
            Err(not_until) => Ok(RateLimitResult {
                allowed: false,
                reset_after: not_until.wait_time_from(self.clock.now()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32) -> InMemoryRateLimiter {
        InMemoryRateLimiter::new(RateLimitConfig {
            max_requests,
            window: Duration::from_secs(60),
        })
    }

    #[tokio::test]
    async fn test_blocks_after_burst() {
        let limiter = limiter(2);
        assert!(limiter.check("user-a").await.unwrap().allowed);
        assert!(limiter.check("user-a").await.unwrap().allowed);

        let blocked = limiter.check("user-a").await.unwrap();
        assert!(!blocked.allowed);
        assert!(blocked.reset_after > Duration::ZERO);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let limiter = limiter(1);
        assert!(limiter.check("user-a").await.unwrap().allowed);
        assert!(!limiter.check("user-a").await.unwrap().allowed);
        assert!(limiter.check("user-b").await.unwrap().allowed);
    }

    #[tokio::test]
    async fn test_idle_keys_are_pruned() {
        let limiter = InMemoryRateLimiter::new(RateLimitConfig {
            max_requests: 1,
            window: Duration::from_millis(20),
        });
        for i in 0..50 {
            limiter.check(&format!("caller-{i}")).await.unwrap();
        }
        assert_eq!(limiter.len(), 50);

        tokio::time::sleep(Duration::from_millis(100)).await;
        limiter.prune();
        assert!(limiter.is_empty());
    }

    #[tokio::test]
    async fn test_checks_sweep_idle_keys() {
        let mut limiter = InMemoryRateLimiter::new(RateLimitConfig {
            max_requests: 1,
            window: Duration::from_millis(20),
        });
        limiter.prune_every = 8;

        for i in 0..7 {
            limiter.check(&format!("caller-{i}")).await.unwrap();
        }
        assert_eq!(limiter.len(), 7);

        tokio::time::sleep(Duration::from_millis(100)).await;
        // The eighth check sweeps before recording its own key.
        limiter.check("latecomer").await.unwrap();
        assert_eq!(limiter.len(), 1);
    }

    #[test]
    fn test_zero_budget_falls_back_to_one() {
        let config = RateLimitConfig {
            max_requests: 0,
            window: Duration::from_secs(60),
        };
        assert_eq!(config.quota().burst_size().get(), 1);
    }
}
