use thiserror::Error;

/// How a protected call failed to settle cleanly.
///
/// Reported to the owner's error hook; the scheduler itself always recovers.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("executor failed: {0}")]
    Failed(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),

    #[error("executor panicked: {0}")]
    Panicked(String),
}

impl ExecutionError {
    pub fn is_panic(&self) -> bool {
        matches!(self, ExecutionError::Panicked(_))
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("rate limit must allow at least one request per window")]
    ZeroLimit,

    #[error("rate limit window must be non-zero")]
    ZeroWindow,

    #[error("rate limiter must track at least one key")]
    ZeroCapacity,
}
