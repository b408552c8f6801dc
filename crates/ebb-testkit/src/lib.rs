//! # ebb-testkit
//!
//! In-process test doubles for the retention harness: a mock EbbDB
//! engine that understands the harness's statement dialect and applies
//! the documented TTL contract lazily at observation points, a mock
//! clock that advances instantly on sleep, and a mock cluster handle
//! whose restart flushes WAL-pending writes.
//!
//! These are test tooling only; none of this is an engine.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clock;
pub mod cluster;
pub mod engine;

pub use clock::MockClock;
pub use cluster::MockCluster;
pub use engine::MockEbb;
