//! Keeps entry/exit quotes for the position form fresh without flooding the
//! pricing backend.
//!
//! Every keystroke in the form (size, leverage, side) asks for a new quote.
//! Entry quotes go through a cooldown scheduler, so at most one request per
//! window leaves the process and the latest form state always wins. Exit
//! quotes are requested rarely but by several widgets at once, so they only
//! need single-flight deduplication.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::logger::warn_if_slow;
use common::time::now_ms;
use scheduler::{
    Executor, KeyedRateLimiter, RateDecision, RateLimitConfig, SchedulePolicy, Scheduler,
    SchedulerStats, TriggerOutcome,
};
use tracing::{debug, info, warn};

use crate::errors::QuoteError;
use crate::source::QuoteSource;
use crate::types::{EntryQuoteRequest, ExitQuoteRequest, QuoteSnapshot};
use crate::view_store::QuoteViewStore;

/// Quote calls slower than this are logged as slow.
const SLOW_QUOTE: Duration = Duration::from_millis(800);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteServiceConfig {
    /// Minimum spacing between two entry-quote requests.
    pub entry_cooldown: Duration,

    /// Optional per-symbol cap on requests that actually reach the source.
    pub rate_limit: Option<RateLimitConfig>,
}

impl Default for QuoteServiceConfig {
    fn default() -> Self {
        Self {
            entry_cooldown: Duration::from_millis(1_000),
            rate_limit: None,
        }
    }
}

type SymbolLimiter = Option<Arc<KeyedRateLimiter<String>>>;

fn admit(limiter: &SymbolLimiter, symbol: &str) -> Result<(), QuoteError> {
    let Some(limiter) = limiter else {
        return Ok(());
    };
    match limiter.check(symbol.to_string()) {
        RateDecision::Allowed { .. } => Ok(()),
        RateDecision::Limited { retry_after } => Err(QuoteError::RateLimited {
            symbol: symbol.to_string(),
            retry_after_ms: retry_after.as_millis() as u64,
        }),
    }
}

struct EntryQuoteExecutor<S> {
    source: Arc<S>,
    store: QuoteViewStore,
    limiter: SymbolLimiter,
}

#[async_trait]
impl<S: QuoteSource> Executor<EntryQuoteRequest> for EntryQuoteExecutor<S> {
    async fn execute(&self, request: EntryQuoteRequest) -> anyhow::Result<()> {
        let fetched = match admit(&self.limiter, &request.symbol) {
            Ok(()) => {
                warn_if_slow("entry_quote", SLOW_QUOTE, self.source.entry_quote(&request)).await
            }
            Err(e) => Err(e),
        };

        match fetched {
            Ok(quote) => {
                debug!(
                    symbol = %request.symbol,
                    entry_price = quote.entry_price,
                    fee_usd = quote.fee_usd,
                    "entry quote published"
                );
                self.store.set_entry(QuoteSnapshot {
                    request,
                    quote,
                    ts_ms: now_ms(),
                });
                Ok(())
            }
            Err(e) => {
                self.store.set_error(e.to_string());
                Err(e.into())
            }
        }
    }
}

struct ExitQuoteExecutor<S> {
    source: Arc<S>,
    store: QuoteViewStore,
    limiter: SymbolLimiter,
}

#[async_trait]
impl<S: QuoteSource> Executor<ExitQuoteRequest> for ExitQuoteExecutor<S> {
    async fn execute(&self, request: ExitQuoteRequest) -> anyhow::Result<()> {
        let fetched = match admit(&self.limiter, &request.symbol) {
            Ok(()) => {
                warn_if_slow("exit_quote", SLOW_QUOTE, self.source.exit_quote(&request)).await
            }
            Err(e) => Err(e),
        };

        match fetched {
            Ok(quote) => {
                debug!(
                    position = %request.position,
                    exit_price = quote.exit_price,
                    pnl_usd = quote.pnl_usd,
                    "exit quote published"
                );
                self.store.set_exit(QuoteSnapshot {
                    request,
                    quote,
                    ts_ms: now_ms(),
                });
                Ok(())
            }
            Err(e) => {
                self.store.set_error(e.to_string());
                Err(e.into())
            }
        }
    }
}

/// Owns one scheduler per quote kind for a single position form.
///
/// Create one per form; dropping it (or calling [`shutdown`](Self::shutdown))
/// cancels pending requests and timers.
pub struct PositionQuoteService {
    entry: Scheduler<EntryQuoteRequest>,
    exit: Scheduler<ExitQuoteRequest>,
    store: QuoteViewStore,
}

impl PositionQuoteService {
    pub fn new<S: QuoteSource>(source: Arc<S>, cfg: QuoteServiceConfig) -> Result<Self, QuoteError> {
        let store = QuoteViewStore::new();

        let limiter: SymbolLimiter = match cfg.rate_limit {
            Some(rl) => Some(Arc::new(KeyedRateLimiter::new(rl).map_err(|e| {
                QuoteError::InvalidRequest(format!("rate limit config: {e}"))
            })?)),
            None => None,
        };

        let entry = Scheduler::builder(
            SchedulePolicy::Cooldown {
                window: cfg.entry_cooldown,
            },
            EntryQuoteExecutor {
                source: Arc::clone(&source),
                store: store.clone(),
                limiter: limiter.clone(),
            },
        )
        .name("entry-quote")
        .on_error(|e| warn!(error = %e, "entry quote request failed"))
        .build();

        let exit = Scheduler::builder(
            SchedulePolicy::SingleFlight,
            ExitQuoteExecutor {
                source,
                store: store.clone(),
                limiter,
            },
        )
        .name("exit-quote")
        .on_error(|e| warn!(error = %e, "exit quote request failed"))
        .build();

        info!(
            entry_cooldown_ms = cfg.entry_cooldown.as_millis() as u64,
            rate_limited = cfg.rate_limit.is_some(),
            "position quote service started"
        );

        Ok(Self { entry, exit, store })
    }

    /// Asks for a fresh entry quote. Invalid requests are rejected up front and
    /// never reach the scheduler.
    pub fn request_entry(&self, request: EntryQuoteRequest) -> Result<TriggerOutcome, QuoteError> {
        request.validate()?;
        Ok(self.entry.trigger(request))
    }

    pub fn request_exit(&self, request: ExitQuoteRequest) -> Result<TriggerOutcome, QuoteError> {
        request.validate()?;
        Ok(self.exit.trigger(request))
    }

    pub fn store(&self) -> &QuoteViewStore {
        &self.store
    }

    pub fn entry_stats(&self) -> SchedulerStats {
        self.entry.stats()
    }

    pub fn exit_stats(&self) -> SchedulerStats {
        self.exit.stats()
    }

    pub fn is_busy(&self) -> bool {
        self.entry.is_busy() || self.exit.is_busy()
    }

    /// Resolves once both schedulers are idle at the same time.
    pub async fn wait_idle(&self) {
        loop {
            self.entry.wait_idle().await;
            self.exit.wait_idle().await;
            if !self.is_busy() {
                return;
            }
        }
    }

    pub fn shutdown(&self) {
        self.entry.dispose();
        self.exit.dispose();
    }
}
