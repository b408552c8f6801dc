//! Run configuration.
//!
//! A [`RunConfig`] carries everything a scenario run may vary: the fixed
//! seed, row counts, timing, naming, and the bounded polling policy used
//! while waiting for the engine's background expiry sweep. Built with the
//! builder pattern and validated before use.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DATABASE_PREFIX, DEFAULT_GRACE_MS, DEFAULT_SEED, DEFAULT_TIME_STEP_MS,
};

/// Bounded retry policy for expiry polling.
///
/// The verification phase polls rather than sleeping a fixed duration,
/// because the engine expires tables in an asynchronous background sweep.
/// Polling is bounded: after `max_attempts` the validator fails instead
/// of hanging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollPolicy {
    /// Maximum number of observation attempts.
    pub max_attempts: u32,
    /// Backoff before the second attempt, in milliseconds.
    pub initial_backoff_ms: u64,
    /// Cap applied to the exponential backoff, in milliseconds.
    pub max_backoff_ms: u64,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_backoff_ms: 500,
            max_backoff_ms: 8_000,
        }
    }
}

impl PollPolicy {
    /// Backoff to apply after attempt `attempt` (0-based), doubling up to
    /// the cap.
    #[must_use]
    pub fn backoff_ms(&self, attempt: u32) -> u64 {
        let shifted = self
            .initial_backoff_ms
            .saturating_mul(1u64.checked_shl(attempt).unwrap_or(u64::MAX));
        shifted.min(self.max_backoff_ms)
    }
}

/// Configuration for one harness run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Fixed seed; the only entropy source in the run.
    pub seed: u64,
    /// Run identifier, embedded in every database name for isolation.
    pub run_id: String,
    /// Database name prefix.
    pub database_prefix: String,
    /// Rows inserted per populated table.
    pub rows: usize,
    /// Child tables created per super table.
    pub child_count: usize,
    /// Normal tables created per topology that includes normals.
    pub normal_count: usize,
    /// Spacing between consecutive row timestamps, in milliseconds.
    pub time_step_ms: i64,
    /// Slack past the TTL deadline before the first verification poll.
    pub grace_ms: u64,
    /// Bounded polling policy for expiry verification.
    pub poll: PollPolicy,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            run_id: "r0".to_string(),
            database_prefix: DATABASE_PREFIX.to_string(),
            rows: 10,
            child_count: 20,
            normal_count: 1,
            time_step_ms: DEFAULT_TIME_STEP_MS,
            grace_ms: DEFAULT_GRACE_MS,
            poll: PollPolicy::default(),
        }
    }
}

impl RunConfig {
    /// Sets the seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the run identifier.
    #[must_use]
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = run_id.into();
        self
    }

    /// Sets the rows per populated table.
    #[must_use]
    pub fn with_rows(mut self, rows: usize) -> Self {
        self.rows = rows;
        self
    }

    /// Sets the child-table count.
    #[must_use]
    pub fn with_child_count(mut self, count: usize) -> Self {
        self.child_count = count;
        self
    }

    /// Sets the timeline step.
    #[must_use]
    pub fn with_time_step_ms(mut self, step: i64) -> Self {
        self.time_step_ms = step;
        self
    }

    /// Sets the polling policy.
    #[must_use]
    pub fn with_poll(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.time_step_ms <= 0 {
            return Err("time_step_ms must be positive".to_string());
        }
        if self.poll.max_attempts == 0 {
            return Err("poll.max_attempts must be at least 1".to_string());
        }
        if self.run_id.is_empty() || self.database_prefix.is_empty() {
            return Err("run_id and database_prefix must be non-empty".to_string());
        }
        Ok(())
    }

    /// The database name for scenario `index` of this run.
    #[must_use]
    pub fn database_name(&self, index: usize) -> String {
        format!("{}_{}_{:02}", self.database_prefix, self.run_id, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(RunConfig::default().validate().is_ok());
    }

    #[test]
    fn test_bad_step_rejected() {
        let config = RunConfig::default().with_time_step_ms(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_database_names_are_distinct_per_scenario() {
        let config = RunConfig::default().with_run_id("abc");
        assert_ne!(config.database_name(0), config.database_name(1));
        assert!(config.database_name(3).contains("abc"));
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let poll = PollPolicy {
            max_attempts: 10,
            initial_backoff_ms: 500,
            max_backoff_ms: 2_000,
        };
        assert_eq!(poll.backoff_ms(0), 500);
        assert_eq!(poll.backoff_ms(1), 1_000);
        assert_eq!(poll.backoff_ms(2), 2_000);
        assert_eq!(poll.backoff_ms(6), 2_000);
        assert_eq!(poll.backoff_ms(63), 2_000);
    }
}
