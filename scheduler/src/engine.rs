//! The scheduler engine.
//!
//! Responsibilities:
//! - Admit calls: start the executor when idle, park the latest parameters
//!   in the coalescing slot when busy.
//! - Drive one busy period per spawned task: execute, settle, wait out the
//!   remaining cooldown, replay the pending call or return to idle.
//! - Release everything on `dispose` (or drop): pending call, timer, drive task.
//!
//! Safety/liveness properties:
//! - At most one executor invocation is in flight per instance. The
//!   `Idle -> Executing` transition happens under a mutex, so this holds on the
//!   multi-threaded runtime too.
//! - Executor errors and panics are reported, never propagated, and a
//!   panicking error hook is contained too: the busy period always ends.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use crate::clock::{Clock, TokioClock};
use crate::error::ExecutionError;
use crate::executor::Executor;
use crate::policy::SchedulePolicy;
use crate::state::{Admission, SchedulerState};
use crate::stats::{Counters, SchedulerStats};
use crate::types::{Phase, TriggerOutcome};

type ErrorHook = Arc<dyn Fn(&ExecutionError) + Send + Sync>;

/// Handle owning one coalescing scheduler.
///
/// Dropping the handle disposes the scheduler. Share it behind an `Arc` when
/// several callers need to trigger the same instance.
pub struct Scheduler<T: Send + 'static> {
    inner: Arc<Inner<T>>,
}

struct Inner<T: Send + 'static> {
    name: String,
    policy: SchedulePolicy,
    executor: Arc<dyn Executor<T>>,
    clock: Arc<dyn Clock>,
    on_error: Option<ErrorHook>,
    counters: Counters,
    state: Mutex<SchedulerState<T>>,
    phase_tx: watch::Sender<Phase>,
}

pub struct SchedulerBuilder<T: Send + 'static> {
    policy: SchedulePolicy,
    executor: Arc<dyn Executor<T>>,
    name: String,
    clock: Arc<dyn Clock>,
    on_error: Option<ErrorHook>,
    counters: Counters,
}

impl<T: Send + 'static> SchedulerBuilder<T> {
    /// Label attached to every log line of this instance.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Called from the drive task whenever the executor fails or panics.
    pub fn on_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ExecutionError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(hook));
        self
    }

    /// Report into an existing set of counters instead of a private one.
    pub fn counters(mut self, counters: Counters) -> Self {
        self.counters = counters;
        self
    }

    pub fn build(self) -> Scheduler<T> {
        let (phase_tx, _) = watch::channel(Phase::Idle);

        debug!(
            scheduler = %self.name,
            policy = self.policy.label(),
            window_ms = self.policy.cooldown_window().as_millis() as u64,
            "scheduler created"
        );

        Scheduler {
            inner: Arc::new(Inner {
                name: self.name,
                policy: self.policy,
                executor: self.executor,
                clock: self.clock,
                on_error: self.on_error,
                counters: self.counters,
                state: Mutex::new(SchedulerState::new()),
                phase_tx,
            }),
        }
    }
}

impl<T: Send + 'static> Scheduler<T> {
    pub fn builder<E>(policy: SchedulePolicy, executor: E) -> SchedulerBuilder<T>
    where
        E: Executor<T>,
    {
        SchedulerBuilder {
            policy,
            executor: Arc::new(executor),
            name: policy.label().to_string(),
            clock: Arc::new(TokioClock),
            on_error: None,
            counters: Counters::default(),
        }
    }

    /// Fixed-cooldown bufferer: consecutive starts are at least `window` apart.
    pub fn cooldown<E>(window: std::time::Duration, executor: E) -> Self
    where
        E: Executor<T>,
    {
        Self::builder(SchedulePolicy::Cooldown { window }, executor).build()
    }

    /// Single-flight with trailing replay.
    pub fn single_flight<E>(executor: E) -> Self
    where
        E: Executor<T>,
    {
        Self::builder(SchedulePolicy::SingleFlight, executor).build()
    }

    /// Submits a call. Never blocks and never fails.
    ///
    /// # Panics
    ///
    /// Starting an execution spawns a task, so this panics when called outside
    /// a Tokio runtime while the scheduler is idle. The scheduler is left idle
    /// in that case and accepts calls again from inside a runtime.
    pub fn trigger(&self, params: T) -> TriggerOutcome {
        let inner = &self.inner;
        Counters::bump(&inner.counters.triggers);
        let runtime = Handle::try_current();

        let mut state = inner.state.lock();
        let previous_start = state.last_started();
        match state.admit(params, inner.clock.now()) {
            Admission::Disposed => {
                Counters::bump(&inner.counters.dropped_after_dispose);
                trace!(scheduler = %inner.name, "trigger ignored after dispose");
                TriggerOutcome::Disposed
            }
            Admission::Coalesced { replaced } => {
                Counters::bump(&inner.counters.coalesced);
                if replaced {
                    Counters::bump(&inner.counters.overwritten);
                }
                debug!(
                    scheduler = %inner.name,
                    phase = ?state.phase(),
                    replaced,
                    "call coalesced into pending slot"
                );
                TriggerOutcome::Coalesced { replaced }
            }
            Admission::Start(params) => match runtime {
                Ok(handle) => {
                    inner.publish(state.phase());
                    // Spawned under the lock: the task cannot reach its idle
                    // transition before the handle is attached.
                    let task = handle.spawn(Arc::clone(inner).drive(params));
                    state.attach_driver(task.abort_handle());
                    TriggerOutcome::Started
                }
                Err(e) => {
                    state.abandon_start(previous_start);
                    drop(state);
                    panic!("scheduler `{}` triggered outside a Tokio runtime: {e}", inner.name);
                }
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn policy(&self) -> SchedulePolicy {
        self.inner.policy
    }

    pub fn phase(&self) -> Phase {
        self.inner.state.lock().phase()
    }

    pub fn is_busy(&self) -> bool {
        self.phase().is_busy()
    }

    pub fn has_pending(&self) -> bool {
        self.inner.state.lock().has_pending()
    }

    /// Start instant of the most recent execution, if any ran yet.
    pub fn last_execution_started(&self) -> Option<Instant> {
        self.inner.state.lock().last_started()
    }

    pub fn stats(&self) -> SchedulerStats {
        self.inner.counters.snapshot()
    }

    pub fn counters(&self) -> &Counters {
        &self.inner.counters
    }

    /// Resolves once the scheduler is idle: nothing executing, no cooldown
    /// running, nothing pending.
    pub async fn wait_idle(&self) {
        let mut rx = self.inner.phase_tx.subscribe();
        // The sender lives in `inner`, which `self` keeps alive.
        let _ = rx.wait_for(|phase| *phase == Phase::Idle).await;
    }

    /// Cancels any running cooldown timer or in-flight execution and drops the
    /// pending call. Later triggers are ignored. Idempotent.
    pub fn dispose(&self) {
        let inner = &self.inner;
        let mut state = inner.state.lock();
        let Some(released) = state.dispose() else {
            return;
        };
        inner.publish(state.phase());
        drop(state);

        debug!(
            scheduler = %inner.name,
            dropped_pending = released.dropped_pending,
            aborted = released.aborted_driver,
            "scheduler disposed"
        );
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.state.lock().is_disposed()
    }
}

impl<T: Send + 'static> Drop for Scheduler<T> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<T: Send + 'static> Inner<T> {
    fn publish(&self, phase: Phase) {
        self.phase_tx.send_replace(phase);
    }

    /// Runs one busy period: the started call plus every trailing replay.
    async fn drive(self: Arc<Self>, mut params: T) {
        let window = self.policy.cooldown_window();

        loop {
            let started = self.clock.now();
            Counters::bump(&self.counters.executions);

            let outcome = AssertUnwindSafe(self.executor.execute(params))
                .catch_unwind()
                .await;
            let elapsed = self.clock.now().saturating_duration_since(started);

            match outcome {
                Ok(Ok(())) => debug!(
                    scheduler = %self.name,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "execution settled"
                ),
                Ok(Err(e)) => self.report(ExecutionError::Failed(e.into())),
                Err(payload) => self.report(ExecutionError::Panicked(panic_message(
                    payload.as_ref(),
                ))),
            }

            let delay = {
                let mut state = self.state.lock();
                let Some(delay) = state.settle(window, self.clock.now()) else {
                    return;
                };
                self.publish(state.phase());
                delay
            };

            if !delay.is_zero() {
                trace!(
                    scheduler = %self.name,
                    delay_ms = delay.as_millis() as u64,
                    "cooldown started"
                );
                self.clock.sleep(delay).await;
            }

            let next = {
                let mut state = self.state.lock();
                let next = state.advance(self.clock.now());
                if !state.is_disposed() {
                    self.publish(state.phase());
                }
                next
            };

            match next {
                Some(next) => {
                    debug!(scheduler = %self.name, "replaying coalesced call");
                    params = next;
                }
                None => {
                    trace!(scheduler = %self.name, "scheduler idle");
                    return;
                }
            }
        }
    }

    fn report(&self, err: ExecutionError) {
        Counters::bump(&self.counters.failures);
        warn!(scheduler = %self.name, error = %err, "execution failed");

        if let Some(hook) = &self.on_error {
            // A panicking hook must not take the drive task down with it.
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| hook(&err))) {
                warn!(
                    scheduler = %self.name,
                    panic = %panic_message(payload.as_ref()),
                    "error hook panicked"
                );
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
