//! Scenario orchestration.
//!
//! [`TtlValidator`] drives one scenario through its state machine:
//!
//! ```text
//! Init -> SchemaCreated -> DataLoaded -> AwaitingExpiry -> Verified -> Done
//! ```
//!
//! with `Aborted` reachable from any state on an unrecoverable failure.
//! The expiry wait polls with bounded exponential backoff rather than
//! trusting a single sleep, because the engine purges in an asynchronous
//! background sweep. Cleanup (dropping the scenario database) runs on
//! every exit path and never masks the primary error.

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use tracing::{info, warn};

use ebb_common::constants::TTL_UNIT_MS;
use ebb_common::{
    Clock, ClusterControl, ClusterError, RunConfig, SchemaDescriptor, SqlExecutor,
    TableClass, Value, ValueOrder,
};
use ebb_datagen::{DataSet, TypedValueGenerator};

use crate::builder::SchemaBuilder;
use crate::error::{AssertionFailure, HarnessError, HarnessResult, Mismatch};
use crate::inserter::TimelineInserter;
use crate::scenario::{Expectation, FlushMode, Scenario, TableExpectation};
use crate::statement;

/// States of the validation state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatorState {
    /// Nothing created yet.
    Init,
    /// Database and topologies exist.
    SchemaCreated,
    /// Rows populated (or intentionally skipped).
    DataLoaded,
    /// Waiting out the TTL and polling the sweep.
    AwaitingExpiry,
    /// Observed state matched every expectation.
    Verified,
    /// Cleanup finished.
    Done,
    /// Terminal failure state.
    Aborted,
}

impl fmt::Display for ValidatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValidatorState::Init => "init",
            ValidatorState::SchemaCreated => "schema_created",
            ValidatorState::DataLoaded => "data_loaded",
            ValidatorState::AwaitingExpiry => "awaiting_expiry",
            ValidatorState::Verified => "verified",
            ValidatorState::Done => "done",
            ValidatorState::Aborted => "aborted",
        };
        write!(f, "{name}")
    }
}

/// Drives one scenario end to end against a deployment.
pub struct TtlValidator<'a> {
    executor: &'a dyn SqlExecutor,
    cluster: Option<&'a dyn ClusterControl>,
    clock: &'a dyn Clock,
    config: &'a RunConfig,
    state: ValidatorState,
}

impl<'a> TtlValidator<'a> {
    /// Creates a validator over the run's collaborators and config.
    #[must_use]
    pub fn new(
        executor: &'a dyn SqlExecutor,
        cluster: Option<&'a dyn ClusterControl>,
        clock: &'a dyn Clock,
        config: &'a RunConfig,
    ) -> Self {
        Self { executor, cluster, clock, config, state: ValidatorState::Init }
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> ValidatorState {
        self.state
    }

    fn transition(&mut self, next: ValidatorState) {
        info!(from = %self.state, to = %next, "state transition");
        self.state = next;
    }

    /// Runs `scenario` inside the freshly named `database`.
    ///
    /// The database is dropped (best effort) on every exit path; partial
    /// state left by an aborted run cannot affect later scenarios because
    /// each uses its own disposable name.
    ///
    /// # Errors
    ///
    /// Setup failures abort the scenario with the corresponding
    /// [`HarnessError`]; an unmet expectation surfaces as
    /// [`HarnessError::Assertion`].
    pub fn run(&mut self, scenario: &Scenario, database: &str) -> HarnessResult<()> {
        info!(scenario = scenario.name, database, "running scenario");
        let result = self.drive(scenario, database);
        self.cleanup(database);
        match result {
            Ok(()) => {
                self.transition(ValidatorState::Done);
                Ok(())
            }
            Err(err) => {
                warn!(scenario = scenario.name, error = %err, "scenario aborted");
                self.transition(ValidatorState::Aborted);
                Err(err)
            }
        }
    }

    fn drive(&mut self, scenario: &Scenario, database: &str) -> HarnessResult<()> {
        let schema = SchemaDescriptor::wide();
        let builder = SchemaBuilder::new(self.executor, database);

        // Init -> SchemaCreated
        builder.create_database(scenario.database_ttl)?;
        let mut targets: Vec<(String, TableClass)> = Vec::new();
        if scenario.topology.super_table {
            builder.create_super_table("stb1", &schema)?;
            let children = builder.create_child_tables(
                "stb1",
                &schema,
                scenario.topology.children,
                |i| vec![Value::Int(i as i32)],
                scenario.topology.child_ttl,
            )?;
            targets.extend(children.into_iter().map(|n| (n, TableClass::Child)));
        }
        let normals = builder.create_normal_tables(
            scenario.topology.normals,
            &schema,
            scenario.topology.normal_ttl,
        )?;
        targets.extend(normals.into_iter().map(|n| (n, TableClass::Normal)));
        self.transition(ValidatorState::SchemaCreated);

        // SchemaCreated -> DataLoaded
        if scenario.rows > 0 {
            let generator = TypedValueGenerator::new(self.config.seed);
            let dataset =
                DataSet::for_schema(&generator, &schema, scenario.rows, ValueOrder::Ordered)?;
            let inserter = TimelineInserter::new(self.executor, database);
            let inserted = inserter.insert(
                &targets,
                &schema,
                &dataset,
                self.clock.now_ms(),
                self.config.time_step_ms,
            )?;
            info!(inserted, "data loaded");
        } else {
            info!("topology left empty on purpose");
        }
        self.transition(ValidatorState::DataLoaded);

        // Preconditions before the wait: re-arm TTLs, then flush if asked.
        let expected = scenario.expectations();
        if let Some(ttl) = scenario.alter_ttl {
            for (table, _) in &targets {
                builder.alter_table_ttl(table, ttl)?;
            }
            // Altering TTL must never drop the table at alter time.
            let mismatches = self.observe(database, &expected, true)?;
            if !mismatches.is_empty() {
                return Err(AssertionFailure {
                    scenario: format!("{} (post-alter)", scenario.name),
                    mismatches,
                }
                .into());
            }
        }
        match scenario.flush {
            FlushMode::None => {}
            FlushMode::Statement => {
                self.executor.execute(&statement::flush_database(database))?;
            }
            FlushMode::Restart => {
                let cluster = self.cluster.ok_or_else(|| {
                    ClusterError::new("restart", "no cluster collaborator configured")
                })?;
                cluster.restart()?;
            }
        }

        // DataLoaded -> AwaitingExpiry
        self.transition(ValidatorState::AwaitingExpiry);
        let deadline_ms =
            u64::from(scenario.max_ttl()) * TTL_UNIT_MS as u64 + self.config.grace_ms;
        self.clock.sleep(Duration::from_millis(deadline_ms));

        // AwaitingExpiry -> Verified, polling for the asynchronous sweep.
        let poll = &self.config.poll;
        let mut mismatches = Vec::new();
        for attempt in 0..poll.max_attempts {
            mismatches = self.observe(database, &expected, false)?;
            if mismatches.is_empty() {
                self.transition(ValidatorState::Verified);
                return Ok(());
            }
            info!(attempt, pending = mismatches.len(), "expiry not yet observed");
            if attempt + 1 < poll.max_attempts {
                self.clock.sleep(Duration::from_millis(poll.backoff_ms(attempt)));
            }
        }
        Err(AssertionFailure { scenario: scenario.name.clone(), mismatches }.into())
    }

    /// One observation pass: existence via `SHOW TABLES`/`SHOW STABLES`,
    /// row counts for tables expected to retain data.
    ///
    /// With `require_all_present` set, every created table must still
    /// exist regardless of its post-expiry expectation (used right after
    /// `ALTER ... TTL`).
    fn observe(
        &self,
        database: &str,
        expected: &[TableExpectation],
        require_all_present: bool,
    ) -> HarnessResult<Vec<Mismatch>> {
        let tables: HashSet<String> = self
            .executor
            .execute(&statement::show_tables(database))?
            .name_list()
            .into_iter()
            .collect();
        let stables: HashSet<String> = self
            .executor
            .execute(&statement::show_stables(database))?
            .name_list()
            .into_iter()
            .collect();

        let mut mismatches = Vec::new();
        let any_present = Expectation::Present { rows: None };
        for item in expected {
            let exists = match item.class {
                TableClass::Super => stables.contains(&item.name),
                TableClass::Child | TableClass::Normal => tables.contains(&item.name),
            };
            let want = if require_all_present { &any_present } else { &item.expectation };
            match want {
                Expectation::Purged => {
                    if exists {
                        mismatches.push(Mismatch {
                            table: item.name.clone(),
                            expected: "purged".to_string(),
                            observed: "present".to_string(),
                        });
                    }
                }
                Expectation::Present { rows } => {
                    if !exists {
                        mismatches.push(Mismatch {
                            table: item.name.clone(),
                            expected: "present".to_string(),
                            observed: "absent".to_string(),
                        });
                        continue;
                    }
                    if let Some(want_rows) = rows {
                        let observed = self
                            .executor
                            .execute(&statement::count_rows(database, &item.name))?
                            .scalar_i64()
                            .unwrap_or(-1);
                        if observed != *want_rows as i64 {
                            mismatches.push(Mismatch {
                                table: item.name.clone(),
                                expected: format!("present with {want_rows} rows"),
                                observed: format!("present with {observed} rows"),
                            });
                        }
                    }
                }
            }
        }
        Ok(mismatches)
    }

    /// Best-effort teardown; a failed drop is logged, never propagated.
    fn cleanup(&self, database: &str) {
        if let Err(err) = self.executor.execute(&statement::drop_database(database)) {
            warn!(database, error = %err, "cleanup drop failed");
        }
    }
}
