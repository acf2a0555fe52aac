//! Entry quote poller.
//!
//! Re-requests the entry quote on a fixed cadence so the displayed price
//! tracks the market while the form is open. Ticks land in the service's
//! cooldown scheduler, so a cadence faster than the cooldown costs nothing
//! extra upstream.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

use crate::service::PositionQuoteService;
use crate::types::EntryQuoteRequest;

/// Runs until `shutdown` flips to `true` or its sender is dropped.
pub async fn run_quote_poller(
    service: Arc<PositionQuoteService>,
    request: EntryQuoteRequest,
    poll_every: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    request
        .validate()
        .with_context(|| format!("refusing to poll {}", request.symbol))?;

    let mut ticker = interval(poll_every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        symbol = %request.symbol,
        side = ?request.side,
        every_ms = poll_every.as_millis() as u64,
        "entry quote poller started"
    );

    let mut ticks = 0u64;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                ticks += 1;
                let outcome = service.request_entry(request.clone())?;
                debug!(tick = ticks, ?outcome, "entry quote poll");
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    info!(symbol = %request.symbol, ticks, "entry quote poller stopped");
    Ok(())
}
