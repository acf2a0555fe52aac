use clap::{Parser, ValueEnum};
use std::time::Duration;

use market::{EntryQuoteRequest, Side};

use crate::config::AppConfig;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SideCli {
    Long,
    Short,
}

impl From<SideCli> for Side {
    fn from(s: SideCli) -> Self {
        match s {
            SideCli::Long => Side::Long,
            SideCli::Short => Side::Short,
        }
    }
}

/// Watch the entry quote of a hypothetical position.
#[derive(Debug, Parser)]
#[clap(name = "quote-watch", version)]
pub struct Cli {
    /// Market symbol, e.g. SOL
    #[clap(long)]
    pub symbol: String,

    #[clap(long, value_enum, default_value = "long")]
    pub side: SideCli,

    /// Collateral in USD
    #[clap(long, default_value = "100.0")]
    pub collateral: f64,

    #[clap(long, default_value = "2.0")]
    pub leverage: f64,

    /// Pricing API base URL (overrides QUOTE_API_URL)
    #[clap(long)]
    pub api_url: Option<String>,

    /// Poll cadence in ms (overrides POLL_INTERVAL_MS)
    #[clap(long)]
    pub interval_ms: Option<u64>,

    /// Entry quote cooldown in ms (overrides ENTRY_COOLDOWN_MS)
    #[clap(long)]
    pub cooldown_ms: Option<u64>,

    /// Emit JSON logs regardless of APP_ENV
    #[clap(long)]
    pub json: bool,
}

impl Cli {
    pub fn entry_request(&self) -> EntryQuoteRequest {
        EntryQuoteRequest {
            symbol: self.symbol.to_uppercase(),
            side: self.side.into(),
            collateral_usd: self.collateral,
            leverage: self.leverage,
        }
    }

    /// Command-line flags win over the environment.
    pub fn apply(&self, mut cfg: AppConfig) -> AppConfig {
        if let Some(url) = &self.api_url {
            cfg.quote_api_url = url.clone();
        }
        if let Some(ms) = self.interval_ms {
            cfg.poll_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = self.cooldown_ms {
            cfg.entry_cooldown = Duration::from_millis(ms);
        }
        cfg.json_logs |= self.json;
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "quote-watch",
            "--symbol",
            "sol",
            "--side",
            "short",
            "--cooldown-ms",
            "300",
            "--json",
        ]);

        let base = AppConfig::from_lookup(|_| None).unwrap();
        let cfg = cli.apply(base.clone());

        assert_eq!(cfg.entry_cooldown, Duration::from_millis(300));
        assert_eq!(cfg.poll_interval, base.poll_interval);
        assert!(cfg.json_logs);

        let req = cli.entry_request();
        assert_eq!(req.symbol, "SOL");
        assert_eq!(req.side, Side::Short);
        assert_eq!(req.size_usd(), 200.0);
    }
}
