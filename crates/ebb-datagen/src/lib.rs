//! # ebb-datagen
//!
//! Synthetic dataset generation for the EbbDB retention harness.
//!
//! This crate produces type-correct, boundary-covering value sequences
//! for every column type EbbDB supports, bundles them into an immutable
//! [`DataSet`] indexed by row number, and assembles insert-ready rows
//! against a schema descriptor. Generation is a pure function of the
//! requested type, count, ordering, and the run's fixed seed; there is no
//! hidden entropy source.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod assembler;
pub mod dataset;
pub mod error;
pub mod generator;

pub use assembler::{Row, RowAssembler};
pub use dataset::DataSet;
pub use error::{DatagenError, DatagenResult};
pub use generator::TypedValueGenerator;
