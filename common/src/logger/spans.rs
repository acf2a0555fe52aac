use std::future::Future;
use std::time::{Duration, Instant};

use tracing::{Span, field};

use super::TraceId;

/// Root span for a long-lived job (a poller, a CLI session).
pub fn root_span(name: &'static str, trace_id: &TraceId) -> Span {
    tracing::info_span!(
        "root",
        name = %name,
        trace_id = %trace_id.as_str(),
        scheduler = field::Empty,
        symbol = field::Empty
    )
}

/// Child span; inherits the trace id from the enclosing root span.
pub fn child_span(name: &'static str) -> Span {
    tracing::info_span!(
        "child",
        name = %name,
        scheduler = field::Empty,
        symbol = field::Empty
    )
}

/// Fills the empty fields declared by [`root_span`] / [`child_span`].
pub fn annotate_span(scheduler: &str, symbol: Option<&str>) {
    let span = Span::current();
    span.record("scheduler", field::display(scheduler));
    if let Some(symbol) = symbol {
        span.record("symbol", field::display(symbol));
    }
}

/// Runs `fut` to completion, warning on the `performance` target when it
/// overruns `budget`.
pub async fn warn_if_slow<F, T>(operation: &'static str, budget: Duration, fut: F) -> T
where
    F: Future<Output = T>,
{
    let started = Instant::now();
    let out = fut.await;

    let took = started.elapsed();
    if took > budget {
        tracing::warn!(
            target: "performance",
            operation,
            took_ms = took.as_millis() as u64,
            budget_ms = budget.as_millis() as u64,
            "operation over latency budget"
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[tokio::test]
    #[traced_test]
    async fn slow_future_is_reported() {
        let out = warn_if_slow("sleepy", Duration::from_millis(1), async {
            std::thread::sleep(Duration::from_millis(5));
            7
        })
        .await;

        assert_eq!(out, 7);
        assert!(logs_contain("operation over latency budget"));
    }

    #[tokio::test]
    #[traced_test]
    async fn fast_future_is_silent() {
        let out = warn_if_slow("quick", Duration::from_secs(5), async { "ok" }).await;

        assert_eq!(out, "ok");
        assert!(!logs_contain("operation over latency budget"));
    }

    #[test]
    #[traced_test]
    fn annotate_records_fields_on_current_span() {
        let trace_id = TraceId::new("t-1");
        let span = root_span("poller", &trace_id);
        let _guard = span.enter();
        annotate_span("entry-quote", Some("SOL"));
        tracing::info!("inside root");

        assert!(logs_contain("entry-quote"));
        assert!(logs_contain("inside root"));
    }
}
