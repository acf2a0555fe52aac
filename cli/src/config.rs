use std::time::Duration;

use anyhow::{Context, Result};

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    /// Base URL of the pricing API.
    pub quote_api_url: String,

    // =========================
    // Request shaping
    // =========================
    /// Minimum spacing between two entry-quote requests.
    ///
    /// Protects the pricing API (and the RPC node behind it) from the
    /// front-end's polling and per-keystroke requests.
    pub entry_cooldown: Duration,

    /// How often the watcher re-requests the entry quote.
    ///
    /// Ticks faster than `entry_cooldown` are coalesced, never queued.
    pub poll_interval: Duration,

    /// Per-request HTTP timeout.
    pub http_timeout: Duration,

    /// Requests per symbol per minute that may reach the API. `0` disables
    /// the limiter.
    pub max_requests_per_minute: u32,

    /// JSON logs when `APP_ENV=production`, pretty logs otherwise.
    pub json_logs: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let millis = |key: &str, default: u64| -> Result<Duration> {
            match lookup(key) {
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .map(Duration::from_millis)
                    .with_context(|| format!("{key} must be a number of milliseconds, got {raw:?}")),
                None => Ok(Duration::from_millis(default)),
            }
        };

        let max_requests_per_minute = match lookup("MAX_REQUESTS_PER_MINUTE") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .with_context(|| format!("MAX_REQUESTS_PER_MINUTE must be an integer, got {raw:?}"))?,
            None => 60,
        };

        Ok(Self {
            quote_api_url: lookup("QUOTE_API_URL")
                .unwrap_or_else(|| "http://localhost:8080/api".to_string()),

            // Request shaping defaults:
            // - one entry quote per second at most
            // - poll often enough that the price never looks stale
            entry_cooldown: millis("ENTRY_COOLDOWN_MS", 1_000)?,
            poll_interval: millis("POLL_INTERVAL_MS", 500)?,
            http_timeout: millis("HTTP_TIMEOUT_MS", 5_000)?,
            max_requests_per_minute,

            json_logs: lookup("APP_ENV").as_deref() == Some("production"),
        })
    }
}
