use once_cell::sync::OnceCell;
use tracing_subscriber::prelude::*;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, fmt};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

const DEFAULT_DIRECTIVES: &str = "info";

/// Installs the process-wide subscriber once; later calls do nothing.
///
/// Filtering comes from `RUST_LOG`, falling back to `info`. Pass `json` for
/// log shipping, leave it off for a terminal.
pub fn init_tracing(service_name: &'static str, json: bool) {
    LOGGER_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

        // Span close events carry busy/idle time for each scheduler run.
        let layer = fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_thread_ids(true)
            .with_span_events(FmtSpan::CLOSE);

        let registry = tracing_subscriber::registry().with(filter);
        if json {
            registry.with(layer.json()).init();
        } else {
            registry.with(layer.pretty()).init();
        }

        tracing::info!(service = service_name, json, "tracing ready");
    });
}
