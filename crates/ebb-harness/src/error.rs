//! Harness error taxonomy.
//!
//! Setup failures (schema, DDL, tag mismatch, insert) are distinct from
//! [`AssertionFailure`], which is the scenario's actual test outcome:
//! the expected TTL state was not observed. [`HarnessError::is_assertion`]
//! separates the two for reporting.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use ebb_common::{ClusterError, ExecutionError, SchemaError};
use ebb_datagen::DatagenError;

/// Result alias for harness operations.
pub type HarnessResult<T> = std::result::Result<T, HarnessError>;

/// One table whose observed state diverged from the expected policy
/// outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mismatch {
    /// The table in question.
    pub table: String,
    /// Expected state ("purged", "present", "present with N rows").
    pub expected: String,
    /// Observed state.
    pub observed: String,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, observed {}",
            self.table, self.expected, self.observed
        )
    }
}

/// The expected TTL outcome was not observed within the polling bound.
///
/// This is the scenario-level test failure, not a harness defect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionFailure {
    /// Scenario that failed.
    pub scenario: String,
    /// Every table whose state diverged, with expected vs observed.
    pub mismatches: Vec<Mismatch>,
}

impl fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scenario '{}' assertion failed:", self.scenario)?;
        for m in &self.mismatches {
            write!(f, " [{m}]")?;
        }
        Ok(())
    }
}

impl std::error::Error for AssertionFailure {}

/// Errors that abort a scenario.
#[derive(Debug, Clone, Error)]
pub enum HarnessError {
    /// A schema descriptor failed validation.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Dataset generation or row assembly failed.
    #[error(transparent)]
    Datagen(#[from] DatagenError),

    /// Tag values supplied for a child do not match the super table's
    /// tag schema. Detected before any statement is issued for the child.
    #[error("tag values for '{table}' do not match tag schema: expected ({expected}), got ({actual})")]
    TagMismatch {
        /// The child table being created.
        table: String,
        /// Rendered tag schema of the super table.
        expected: String,
        /// Rendered tag values supplied.
        actual: String,
    },

    /// The engine refused a DDL statement.
    #[error("DDL for '{object}' failed: {source}")]
    Ddl {
        /// Database or table the DDL targeted.
        object: String,
        /// The engine's refusal.
        source: ExecutionError,
    },

    /// A row insertion failed; remaining rows for that table are skipped.
    #[error("insert into '{table}' failed at row {row_index}: {source}")]
    Insert {
        /// Destination table.
        table: String,
        /// 0-based index of the failed row.
        row_index: usize,
        /// The engine's refusal.
        source: ExecutionError,
    },

    /// A verification query failed outright (as opposed to returning an
    /// unexpected result).
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// The cluster lifecycle collaborator failed a precondition step.
    #[error(transparent)]
    Cluster(#[from] ClusterError),

    /// The scenario's expected TTL outcome was not observed.
    #[error(transparent)]
    Assertion(#[from] AssertionFailure),
}

impl HarnessError {
    /// True for the scenario-level test failure, false for setup errors.
    #[must_use]
    pub const fn is_assertion(&self) -> bool {
        matches!(self, HarnessError::Assertion(_))
    }
}
