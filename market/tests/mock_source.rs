#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use market::{
    EntryQuote, EntryQuoteRequest, ExitQuote, ExitQuoteRequest, QuoteError, QuoteSource, Side,
};
use parking_lot::Mutex;

/// In-memory pricing backend.
///
/// Entry price is `collateral * leverage / 10`, which makes it easy to tell
/// which request produced a published quote.
#[derive(Default)]
pub struct MockQuoteSource {
    pub entry_requests: Mutex<Vec<EntryQuoteRequest>>,
    pub exit_requests: Mutex<Vec<ExitQuoteRequest>>,
    pub latency: Duration,
    failures_left: AtomicUsize,
}

impl MockQuoteSource {
    pub fn with_latency(latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            latency,
            ..Self::default()
        })
    }

    /// The next `n` calls fail with an upstream error.
    pub fn fail_next(&self, n: usize) {
        self.failures_left.store(n, Ordering::SeqCst);
    }

    pub fn entry_calls(&self) -> usize {
        self.entry_requests.lock().len()
    }

    pub fn exit_calls(&self) -> usize {
        self.exit_requests.lock().len()
    }

    fn should_fail(&self) -> bool {
        self.failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl QuoteSource for MockQuoteSource {
    async fn entry_quote(&self, request: &EntryQuoteRequest) -> Result<EntryQuote, QuoteError> {
        self.entry_requests.lock().push(request.clone());
        tokio::time::sleep(self.latency).await;

        if self.should_fail() {
            return Err(QuoteError::InvalidResponse("upstream 503".into()));
        }

        let price = request.size_usd() / 10.0;
        Ok(EntryQuote {
            entry_price: price,
            liquidation_price: price * 0.8,
            fee_usd: request.size_usd() * 0.001,
        })
    }

    async fn exit_quote(&self, request: &ExitQuoteRequest) -> Result<ExitQuote, QuoteError> {
        self.exit_requests.lock().push(request.clone());
        tokio::time::sleep(self.latency).await;

        if self.should_fail() {
            return Err(QuoteError::InvalidResponse("upstream 503".into()));
        }

        Ok(ExitQuote {
            exit_price: 100.0,
            fee_usd: 0.1,
            pnl_usd: request.close_size_usd * 0.05,
            amount_out_usd: request.close_size_usd,
        })
    }
}

pub fn entry(symbol: &str, collateral_usd: f64, leverage: f64) -> EntryQuoteRequest {
    EntryQuoteRequest {
        symbol: symbol.into(),
        side: Side::Long,
        collateral_usd,
        leverage,
    }
}

pub fn exit(position: &str, close_size_usd: f64) -> ExitQuoteRequest {
    ExitQuoteRequest {
        position: position.into(),
        symbol: "SOL".into(),
        side: Side::Long,
        close_size_usd,
    }
}
