//! Internal scheduler state.
//!
//! Pure transition logic; the engine wraps it in a mutex and drives it from
//! `trigger` and the drive task. Keeping it free of async and IO lets the
//! state machine be tested without a runtime.

use std::time::Duration;

use tokio::task::AbortHandle;
use tokio::time::Instant;

use crate::clock::remaining_cooldown;
use crate::slot::CoalescingSlot;
use crate::types::Phase;

/// Decision taken for an incoming call.
#[derive(Debug)]
pub(crate) enum Admission<T> {
    Start(T),
    Coalesced { replaced: bool },
    Disposed,
}

/// What `dispose` released.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Released {
    pub dropped_pending: bool,
    pub aborted_driver: bool,
}

#[derive(Debug)]
pub(crate) struct SchedulerState<T> {
    phase: Phase,
    slot: CoalescingSlot<T>,
    last_started: Option<Instant>,
    driver: Option<AbortHandle>,
    disposed: bool,
}

impl<T> SchedulerState<T> {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            slot: CoalescingSlot::new(),
            last_started: None,
            driver: None,
            disposed: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn has_pending(&self) -> bool {
        self.slot.is_pending()
    }

    pub fn last_started(&self) -> Option<Instant> {
        self.last_started
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Idle -> Executing, or park the call in the slot while busy.
    pub fn admit(&mut self, params: T, now: Instant) -> Admission<T> {
        if self.disposed {
            return Admission::Disposed;
        }

        if self.phase.is_busy() {
            let replaced = self.slot.set(params).is_some();
            return Admission::Coalesced { replaced };
        }

        self.slot.clear();
        self.begin(now);
        Admission::Start(params)
    }

    /// Undoes a `Start` admission whose drive task could not be spawned.
    pub fn abandon_start(&mut self, last_started: Option<Instant>) {
        self.phase = Phase::Idle;
        self.last_started = last_started;
        self.driver = None;
    }

    /// Records the task driving the current busy period so `dispose` can stop it.
    pub fn attach_driver(&mut self, handle: AbortHandle) {
        self.driver = Some(handle);
    }

    /// Executing -> Cooldown once the executor settled.
    ///
    /// Returns the delay before the slot may be drained, or `None` when the
    /// scheduler was disposed in the meantime.
    pub fn settle(&mut self, window: Duration, now: Instant) -> Option<Duration> {
        if self.disposed {
            return None;
        }

        let started = self.last_started.unwrap_or(now);
        let delay = remaining_cooldown(window, started, now);
        if !delay.is_zero() {
            self.phase = Phase::Cooldown;
        }
        Some(delay)
    }

    /// Cooldown -> Executing with the pending call, or -> Idle if there is none.
    pub fn advance(&mut self, now: Instant) -> Option<T> {
        if self.disposed {
            return None;
        }

        match self.slot.take() {
            Some(next) => {
                self.begin(now);
                Some(next)
            }
            None => {
                self.phase = Phase::Idle;
                self.driver = None;
                None
            }
        }
    }

    /// Drops the pending call and stops the drive task. Idempotent.
    pub fn dispose(&mut self) -> Option<Released> {
        if self.disposed {
            return None;
        }
        self.disposed = true;

        let dropped_pending = self.slot.clear();
        let aborted_driver = match self.driver.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        };
        self.phase = Phase::Idle;

        Some(Released {
            dropped_pending,
            aborted_driver,
        })
    }

    fn begin(&mut self, now: Instant) {
        self.phase = Phase::Executing;
        self.last_started = Some(now);
    }
}
