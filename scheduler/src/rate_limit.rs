//! Fixed-window rate limiting per key (client address, wallet, API route).
//!
//! Keys live in a bounded LRU so memory stays flat no matter how many
//! distinct callers show up; the least recently seen key is forgotten first.

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use lru::LruCache;
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::clock::{Clock, TokioClock};
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests allowed per key within one window.
    pub limit: u32,
    pub window: Duration,
    /// Upper bound on tracked keys.
    pub max_keys: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            limit: 30,
            window: Duration::from_secs(60),
            max_keys: 500,
        }
    }
}

impl RateLimitConfig {
    pub fn validate(&self) -> Result<NonZeroUsize, ConfigError> {
        if self.limit == 0 {
            return Err(ConfigError::ZeroLimit);
        }
        if self.window.is_zero() {
            return Err(ConfigError::ZeroWindow);
        }
        NonZeroUsize::new(self.max_keys).ok_or(ConfigError::ZeroCapacity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed { .. })
    }
}

#[derive(Debug)]
struct WindowCounter {
    started: Instant,
    hits: u32,
}

pub struct KeyedRateLimiter<K: Hash + Eq> {
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
    windows: Mutex<LruCache<K, WindowCounter>>,
}

impl<K: Hash + Eq> KeyedRateLimiter<K> {
    pub fn new(config: RateLimitConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, Arc::new(TokioClock))
    }

    pub fn with_clock(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        let capacity = config.validate()?;
        Ok(Self {
            config,
            clock,
            windows: Mutex::new(LruCache::new(capacity)),
        })
    }

    /// Counts one request for `key` and says whether it may proceed.
    pub fn check(&self, key: K) -> RateDecision {
        let now = self.clock.now();
        let RateLimitConfig { limit, window, .. } = self.config;
        let mut windows = self.windows.lock();

        if let Some(counter) = windows.get_mut(&key) {
            let elapsed = now.saturating_duration_since(counter.started);
            if elapsed >= window {
                counter.started = now;
                counter.hits = 0;
            }

            if counter.hits >= limit {
                let retry_after = window.saturating_sub(elapsed);
                debug!(
                    retry_after_ms = retry_after.as_millis() as u64,
                    "rate limit exceeded"
                );
                return RateDecision::Limited { retry_after };
            }

            counter.hits += 1;
            return RateDecision::Allowed {
                remaining: limit - counter.hits,
            };
        }

        windows.put(
            key,
            WindowCounter {
                started: now,
                hits: 1,
            },
        );
        RateDecision::Allowed {
            remaining: limit - 1,
        }
    }

    /// Forgets `key`, giving it a fresh window on its next request.
    pub fn reset(&self, key: &K) {
        self.windows.lock().pop(key);
    }

    pub fn tracked_keys(&self) -> usize {
        self.windows.lock().len()
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(limit: u32, window_ms: u64, max_keys: usize) -> KeyedRateLimiter<&'static str> {
        KeyedRateLimiter::new(RateLimitConfig {
            limit,
            window: Duration::from_millis(window_ms),
            max_keys,
        })
        .expect("valid config")
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let base = RateLimitConfig::default();

        let zero_limit = RateLimitConfig { limit: 0, ..base };
        let zero_window = RateLimitConfig {
            window: Duration::ZERO,
            ..base
        };
        let zero_keys = RateLimitConfig { max_keys: 0, ..base };

        assert_eq!(zero_limit.validate(), Err(ConfigError::ZeroLimit));
        assert_eq!(zero_window.validate(), Err(ConfigError::ZeroWindow));
        assert_eq!(zero_keys.validate(), Err(ConfigError::ZeroCapacity));
        assert!(KeyedRateLimiter::<u8>::new(zero_keys).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn limits_within_window_then_recovers() {
        let rl = limiter(2, 1_000, 16);

        assert_eq!(rl.check("ip-1"), RateDecision::Allowed { remaining: 1 });
        assert_eq!(rl.check("ip-1"), RateDecision::Allowed { remaining: 0 });

        tokio::time::advance(Duration::from_millis(400)).await;
        assert_eq!(
            rl.check("ip-1"),
            RateDecision::Limited {
                retry_after: Duration::from_millis(600)
            }
        );

        tokio::time::advance(Duration::from_millis(600)).await;
        assert!(rl.check("ip-1").is_allowed());
    }

    #[tokio::test(start_paused = true)]
    async fn keys_are_limited_independently() {
        let rl = limiter(1, 1_000, 16);

        assert!(rl.check("a").is_allowed());
        assert!(!rl.check("a").is_allowed());
        assert!(rl.check("b").is_allowed());
    }

    #[tokio::test(start_paused = true)]
    async fn least_recently_seen_key_is_evicted() {
        let rl = limiter(1, 60_000, 2);

        assert!(rl.check("a").is_allowed());
        assert!(rl.check("b").is_allowed());
        // Touch "a" so "b" becomes the eviction candidate.
        assert!(!rl.check("a").is_allowed());
        assert!(rl.check("c").is_allowed());

        assert_eq!(rl.tracked_keys(), 2);
        // "b" was forgotten and starts a fresh window; "c" is still limited.
        assert!(rl.check("b").is_allowed());
        assert!(!rl.check("c").is_allowed());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_clears_a_single_key() {
        let rl = limiter(1, 60_000, 8);

        rl.check("a");
        rl.check("b");
        rl.reset(&"a");

        assert!(rl.check("a").is_allowed());
        assert!(!rl.check("b").is_allowed());
    }
}
