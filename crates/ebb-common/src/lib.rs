//! # ebb-common
//!
//! Shared building blocks for the EbbDB retention harness: the column and
//! value vocabulary, schema descriptors, run configuration, and the narrow
//! contracts through which the harness talks to a deployment.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod exec;
pub mod schema;
pub mod types;

pub use clock::{Clock, SystemClock};
pub use config::{PollPolicy, RunConfig};
pub use error::{ClusterError, ExecutionError, SchemaError, SchemaResult};
pub use exec::{ClusterControl, ExecResult, QueryResult, SqlExecutor};
pub use schema::{ColumnDef, SchemaDescriptor};
pub use types::{ColumnType, TableClass, Value, ValueOrder};
