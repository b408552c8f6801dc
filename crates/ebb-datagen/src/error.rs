//! Generation and assembly errors.

use thiserror::Error;

/// Result alias for generator and assembler operations.
pub type DatagenResult<T> = std::result::Result<T, DatagenError>;

/// Errors produced while generating values or assembling rows.
#[derive(Debug, Clone, Error)]
pub enum DatagenError {
    /// A request asked for values outside a type's legal domain
    /// (e.g. an illegal text bound). Programming error, fatal to the run.
    #[error("requested values outside the legal domain of {ty}")]
    OutOfDomain {
        /// The offending type, including any bound.
        ty: String,
    },

    /// A row index beyond the dataset's row count was requested.
    #[error("row index {index} out of range for dataset of {rows} rows")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Rows the dataset was built with.
        rows: usize,
    },

    /// A schema column's type has no sequence in the dataset.
    #[error("dataset has no sequence for column type {ty}")]
    MissingSequence {
        /// The missing type.
        ty: String,
    },
}
