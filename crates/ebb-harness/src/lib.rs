//! # ebb-harness
//!
//! The multi-topology insertion and TTL validation driver for EbbDB.
//!
//! This crate owns the scenario orchestration: it builds super, child,
//! and normal tables against a target database, populates them with
//! deterministic descending timelines drawn from `ebb-datagen`, waits out
//! the configured TTL, and asserts which tables survive the engine's
//! background expiry sweep. All SQL text is rendered in one place
//! ([`statement`]); the engine is reached only through the
//! `ebb-common` collaborator traits.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod error;
pub mod inserter;
pub mod report;
pub mod scenario;
pub mod statement;
pub mod validator;

pub use builder::SchemaBuilder;
pub use error::{AssertionFailure, HarnessError, HarnessResult, Mismatch};
pub use inserter::TimelineInserter;
pub use report::{run_suite, ScenarioReport, SuiteReport};
pub use scenario::{Expectation, FlushMode, Scenario, TableExpectation, TopologySpec};
pub use validator::{TtlValidator, ValidatorState};
