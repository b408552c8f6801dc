//! Shared error types for the harness crates.
//!
//! Each crate carries its own `thiserror` enum; the ones here are the
//! errors that cross crate boundaries: schema validation failures and the
//! two collaborator error types.

use thiserror::Error;

/// Result alias for schema validation.
pub type SchemaResult<T> = std::result::Result<T, SchemaError>;

/// A schema descriptor failed validation.
#[derive(Debug, Clone, Error)]
pub enum SchemaError {
    /// The descriptor declares no data columns at all.
    #[error("schema has no data columns")]
    Empty,

    /// The first data column must be the primary timestamp.
    #[error("first data column must be '{expected}' TIMESTAMP, found '{found}'")]
    BadPrimary {
        /// Required primary column name.
        expected: String,
        /// Name of the column actually declared first.
        found: String,
    },

    /// A column name appears more than once across data and tag columns.
    #[error("duplicate column name '{name}'")]
    DuplicateColumn {
        /// The repeated name.
        name: String,
    },

    /// A text column declares a bound outside the engine's limits.
    #[error("column '{name}' declares illegal text bound in {ty}")]
    IllegalBound {
        /// Offending column.
        name: String,
        /// Declared type, including the bound.
        ty: String,
    },

    /// A super-table schema declares no tag columns.
    #[error("super table schema requires at least one tag column")]
    MissingTags,

    /// An insertable schema needs at least one column beyond the primary.
    #[error("schema has no data columns beyond the primary timestamp")]
    OnlyPrimary,
}

/// The SQL collaborator refused or failed a statement.
#[derive(Debug, Clone, Error)]
#[error("statement failed: {message} (statement: {statement})")]
pub struct ExecutionError {
    /// The statement as submitted.
    pub statement: String,
    /// The engine's reason.
    pub message: String,
}

impl ExecutionError {
    /// Creates an execution error for a statement.
    #[must_use]
    pub fn new(statement: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            message: message.into(),
        }
    }
}

/// The cluster lifecycle collaborator failed a node operation.
#[derive(Debug, Clone, Error)]
#[error("cluster operation '{operation}' failed: {message}")]
pub struct ClusterError {
    /// The operation attempted (`stop`, `start`, `restart`).
    pub operation: String,
    /// The collaborator's reason.
    pub message: String,
}

impl ClusterError {
    /// Creates a cluster error for an operation.
    #[must_use]
    pub fn new(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            message: message.into(),
        }
    }
}
