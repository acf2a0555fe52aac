use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Minimal counters for operational visibility.
///
/// Cloning shares the underlying atomics, so several schedulers can report
/// into one set of counters.
#[derive(Clone, Default, Debug)]
pub struct Counters {
    pub triggers: Arc<AtomicU64>,
    pub executions: Arc<AtomicU64>,

    // coalescing
    pub coalesced: Arc<AtomicU64>,
    pub overwritten: Arc<AtomicU64>,

    pub failures: Arc<AtomicU64>,
    pub dropped_after_dispose: Arc<AtomicU64>,
}

impl Counters {
    pub fn snapshot(&self) -> SchedulerStats {
        SchedulerStats {
            triggers: self.triggers.load(Ordering::Relaxed),
            executions: self.executions.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            overwritten: self.overwritten.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            dropped_after_dispose: self.dropped_after_dispose.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Point-in-time copy of [`Counters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub triggers: u64,
    pub executions: u64,
    pub coalesced: u64,
    pub overwritten: u64,
    pub failures: u64,
    pub dropped_after_dispose: u64,
}
