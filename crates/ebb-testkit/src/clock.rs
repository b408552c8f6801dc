//! Deterministic mock clock.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use ebb_common::Clock;

/// A clock whose `sleep` advances simulated time instantly, so scenarios
/// that wait out a TTL run in microseconds of wall time.
#[derive(Debug)]
pub struct MockClock {
    now_ms: AtomicI64,
}

impl MockClock {
    /// Creates a clock starting at `start_ms` epoch milliseconds.
    #[must_use]
    pub fn new(start_ms: i64) -> Self {
        Self { now_ms: AtomicI64::new(start_ms) }
    }

    /// Advances simulated time.
    pub fn advance(&self, duration: Duration) {
        self.now_ms
            .fetch_add(duration.as_millis() as i64, Ordering::SeqCst);
    }
}

impl Default for MockClock {
    fn default() -> Self {
        // An arbitrary but realistic fixed epoch: 2024-01-01T00:00:00Z.
        Self::new(1_704_067_200_000)
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}
