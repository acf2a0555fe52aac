//! Execution policies.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulePolicy {
    /// Fixed-cooldown bufferer: execute immediately when idle, otherwise keep
    /// the latest call and replay it once `window` has elapsed since the
    /// previous start.
    Cooldown { window: Duration },

    /// Single-flight with trailing replay: no spacing, the coalesced call runs
    /// as soon as the current one settles.
    SingleFlight,
}

impl SchedulePolicy {
    /// Minimum start-to-start spacing enforced by this policy.
    pub fn cooldown_window(&self) -> Duration {
        match self {
            SchedulePolicy::Cooldown { window } => *window,
            SchedulePolicy::SingleFlight => Duration::ZERO,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SchedulePolicy::Cooldown { .. } => "cooldown",
            SchedulePolicy::SingleFlight => "single_flight",
        }
    }
}
