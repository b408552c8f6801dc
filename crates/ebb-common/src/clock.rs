//! Clock abstraction.
//!
//! Everything time-dependent in the harness (reference timestamps,
//! expiry deadlines, poll backoff) goes through [`Clock`] so tests can
//! substitute a mock that advances instantly.

use std::time::Duration;

/// Source of "now" and of waiting.
pub trait Clock: Send + Sync {
    /// Current time as milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;

    /// Blocks (or simulates blocking) for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Wall-clock implementation backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    /// Creates a system clock.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_past_2020() {
        // 2020-01-01T00:00:00Z in epoch milliseconds.
        assert!(SystemClock::new().now_ms() > 1_577_836_800_000);
    }
}
