//! Time source used by the scheduler and the rate limiter.
//!
//! Built on `tokio::time`, so tests pause and advance time with tokio's
//! `test-util` clock instead of a hand-rolled fake.

use std::time::Duration;

use futures::future::BoxFuture;
use tokio::time::Instant;

pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;

    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// Time left before the next execution may start.
///
/// Spacing is measured start-to-start. An execution that outlived the window
/// yields zero rather than a negative delay.
pub fn remaining_cooldown(window: Duration, started: Instant, now: Instant) -> Duration {
    window.saturating_sub(now.saturating_duration_since(started))
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(1_000);

    #[test]
    fn remaining_is_window_minus_elapsed() {
        let t0 = Instant::now();
        let remaining = remaining_cooldown(WINDOW, t0, t0 + Duration::from_millis(150));
        assert_eq!(remaining, Duration::from_millis(850));
    }

    #[test]
    fn overrun_clamps_to_zero() {
        let t0 = Instant::now();
        let remaining = remaining_cooldown(WINDOW, t0, t0 + Duration::from_millis(1_700));
        assert_eq!(remaining, Duration::ZERO);
    }

    #[test]
    fn zero_window_never_waits() {
        let t0 = Instant::now();
        assert_eq!(remaining_cooldown(Duration::ZERO, t0, t0), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_clock_follows_paused_time() {
        let clock = TokioClock;
        let before = clock.now();

        clock.sleep(Duration::from_millis(250)).await;

        assert_eq!(clock.now() - before, Duration::from_millis(250));
    }
}
