//! Collaborator contracts.
//!
//! The harness talks to a deployment through exactly two traits: a SQL
//! executor that submits one statement and returns a result, and a cluster
//! lifecycle handle used only to set up preconditions (WAL flushes via
//! restart). Nothing else about the engine is in scope.

use crate::error::{ClusterError, ExecutionError};
use crate::types::Value;

/// Result alias for executor calls.
pub type ExecResult = std::result::Result<QueryResult, ExecutionError>;

/// Result of one executed statement.
///
/// DDL and DML report `rows_affected` with no rows; queries carry named
/// columns and value rows.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    /// Column names, empty for non-queries.
    pub columns: Vec<String>,
    /// Result rows.
    pub rows: Vec<Vec<Value>>,
    /// Rows affected by DML.
    pub rows_affected: u64,
}

impl QueryResult {
    /// A result carrying no rows, with an affected count.
    #[must_use]
    pub fn affected(rows_affected: u64) -> Self {
        Self { rows_affected, ..Self::default() }
    }

    /// A single-column result listing names.
    #[must_use]
    pub fn names(column: impl Into<String>, names: Vec<String>) -> Self {
        Self {
            columns: vec![column.into()],
            rows: names.into_iter().map(|n| vec![Value::Binary(n)]).collect(),
            rows_affected: 0,
        }
    }

    /// A single-cell scalar result.
    #[must_use]
    pub fn scalar(column: impl Into<String>, value: Value) -> Self {
        Self {
            columns: vec![column.into()],
            rows: vec![vec![value]],
            rows_affected: 0,
        }
    }

    /// The first cell as an `i64`, if present and numeric.
    #[must_use]
    pub fn scalar_i64(&self) -> Option<i64> {
        self.rows.first()?.first()?.as_i64()
    }

    /// The first column as strings, for name-list results.
    #[must_use]
    pub fn name_list(&self) -> Vec<String> {
        self.rows
            .iter()
            .filter_map(|row| row.first())
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect()
    }

    /// True when the result carries no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Submits one SQL statement to the engine.
///
/// All DDL, DML, and verification queries the harness issues go through
/// this single method; errors carry the offending statement.
pub trait SqlExecutor: Send + Sync {
    /// Executes `statement` and returns its result.
    ///
    /// # Errors
    ///
    /// [`ExecutionError`] naming the statement when the engine refuses or
    /// fails it.
    fn execute(&self, statement: &str) -> ExecResult;
}

/// Controls database node lifecycle.
///
/// Consumed only to establish preconditions (a restart flushes
/// WAL-pending writes) before a scenario's verification phase.
pub trait ClusterControl: Send + Sync {
    /// Stops node `node_id`.
    ///
    /// # Errors
    ///
    /// [`ClusterError`] when the node cannot be stopped.
    fn stop_node(&self, node_id: u32) -> Result<(), ClusterError>;

    /// Starts node `node_id`.
    ///
    /// # Errors
    ///
    /// [`ClusterError`] when the node cannot be started.
    fn start_node(&self, node_id: u32) -> Result<(), ClusterError>;

    /// Restarts the whole deployment, flushing pending WAL data.
    ///
    /// # Errors
    ///
    /// [`ClusterError`] when the restart fails.
    fn restart(&self) -> Result<(), ClusterError>;
}
