pub mod cli;
pub mod config;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::{Instrument, info, warn};

use cli::Cli;
use common::logger::{TraceId, annotate_span, child_span, init_tracing, root_span};
use config::AppConfig;
use market::poller::run_quote_poller;
use market::{HttpQuoteClient, PositionQuoteService, QuoteServiceConfig};
use scheduler::RateLimitConfig;

fn service_config(cfg: &AppConfig) -> QuoteServiceConfig {
    let rate_limit = (cfg.max_requests_per_minute > 0).then(|| RateLimitConfig {
        limit: cfg.max_requests_per_minute,
        window: Duration::from_secs(60),
        ..RateLimitConfig::default()
    });

    QuoteServiceConfig {
        entry_cooldown: cfg.entry_cooldown,
        rate_limit,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    let cfg = args.apply(AppConfig::from_env()?);

    init_tracing("quote-watch", cfg.json_logs);

    let request = args.entry_request();
    let trace_id = TraceId::default();
    let span = root_span("quote_watch", &trace_id);
    {
        let _guard = span.enter();
        annotate_span("entry-quote", Some(&request.symbol));
    }

    let client = Arc::new(HttpQuoteClient::new(&cfg.quote_api_url, cfg.http_timeout)?);
    let service = Arc::new(PositionQuoteService::new(client, service_config(&cfg))?);

    info!(
        parent: &span,
        api = %cfg.quote_api_url,
        poll_ms = cfg.poll_interval.as_millis() as u64,
        "starting quote watcher"
    );

    // Print every published quote.
    let mut updates = service.store().subscribe();
    tokio::spawn(
        async move {
            while updates.changed().await.is_ok() {
                let view = updates.borrow_and_update().clone();
                match (&view.entry, &view.last_error) {
                    (_, Some(err)) => warn!(error = %err, "quote unavailable"),
                    (Some(snap), None) => info!(
                        entry_price = snap.quote.entry_price,
                        liquidation_price = snap.quote.liquidation_price,
                        fee_usd = snap.quote.fee_usd,
                        size_usd = snap.request.size_usd(),
                        "entry quote"
                    ),
                    (None, None) => {}
                }
            }
        }
        .instrument(span.in_scope(|| child_span("quote_printer"))),
    );

    let (stop_tx, stop_rx) = watch::channel(false);
    let poller = tokio::spawn(
        run_quote_poller(Arc::clone(&service), request, cfg.poll_interval, stop_rx)
            .instrument(span.clone()),
    );

    tokio::signal::ctrl_c().await?;
    info!(parent: &span, "shutdown signal received");

    let _ = stop_tx.send(true);
    poller.await??;
    service.shutdown();

    let entry = service.entry_stats();
    info!(
        parent: &span,
        triggers = entry.triggers,
        executions = entry.executions,
        coalesced = entry.coalesced,
        failures = entry.failures,
        "quote watcher stopped"
    );

    Ok(())
}
