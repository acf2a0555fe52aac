//! Shared types used by the scheduler subsystem.

/// Lifecycle phase of a scheduler instance.
///
/// `Executing` covers both policies' "in flight" state. `Cooldown` is only
/// entered under [`SchedulePolicy::Cooldown`](crate::SchedulePolicy) while the
/// remaining spacing is non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Executing,
    Cooldown,
}

impl Phase {
    pub fn is_busy(&self) -> bool {
        !matches!(self, Phase::Idle)
    }
}

/// What happened to one `trigger` call.
///
/// None of these are failures: a coalesced or replaced call is the expected
/// outcome while the scheduler is busy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// The executor was started with these parameters.
    Started,
    /// Parameters were parked in the pending slot. `replaced` is set when an
    /// earlier pending call was discarded in favour of this one.
    Coalesced { replaced: bool },
    /// The scheduler was disposed; the call was dropped.
    Disposed,
}
