//! Coalescing request scheduler.
//!
//! Guards an expensive asynchronous operation (an RPC call, a pricing API
//! request) so that at most one invocation is in flight per scheduler, calls
//! arriving while busy collapse into a single trailing replay carrying the most
//! recent parameters, and (optionally) consecutive starts are spaced by a
//! minimum cooldown window.
//!
//! ```ignore
//! let sched = Scheduler::cooldown(Duration::from_secs(1), executor_fn(|symbol: String| async move {
//!     fetch_entry_price(&symbol).await
//! }));
//! sched.trigger("SOL".to_string());
//! ```

pub mod clock;
pub mod engine;
pub mod error;
pub mod executor;
pub mod policy;
pub mod rate_limit;
pub mod slot;
pub mod stats;
pub mod types;

mod state;

pub use clock::{Clock, TokioClock, remaining_cooldown};
pub use engine::{Scheduler, SchedulerBuilder};
pub use error::{ConfigError, ExecutionError};
pub use executor::{Executor, FnExecutor, executor_fn};
pub use policy::SchedulePolicy;
pub use rate_limit::{KeyedRateLimiter, RateDecision, RateLimitConfig};
pub use slot::CoalescingSlot;
pub use stats::{Counters, SchedulerStats};
pub use types::{Phase, TriggerOutcome};
