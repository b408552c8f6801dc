//! End-to-end TTL scenario tests.
//!
//! Each test drives the real validator, builder, and inserter against
//! the in-process mock deployment; only the engine, clock, and cluster
//! are doubles.

use ebb_common::{PollPolicy, RunConfig, SqlExecutor};
use ebb_harness::{
    run_suite, HarnessError, Scenario, TtlValidator, ValidatorState,
};
use ebb_test::utils::{init_logging, mock_deployment};

fn config() -> RunConfig {
    init_logging();
    RunConfig::default().with_run_id("it")
}

fn scenario(config: &RunConfig, name: &str) -> Scenario {
    Scenario::suite(config)
        .into_iter()
        .find(|s| s.name == name)
        .unwrap_or_else(|| panic!("no scenario named '{name}'"))
}

#[test]
fn test_empty_children_are_purged_super_persists() {
    let config = config();
    let deployment = mock_deployment();
    let scenario = scenario(&config, "super_children_empty");

    let mut validator = TtlValidator::new(
        deployment.engine.as_ref(),
        Some(&deployment.cluster),
        deployment.clock.as_ref(),
        &config,
    );
    validator.run(&scenario, "db_a").unwrap();
    assert_eq!(validator.state(), ValidatorState::Done);
}

#[test]
fn test_wal_pending_children_keep_their_rows() {
    let config = config();
    let deployment = mock_deployment();
    let scenario = scenario(&config, "children_wal_pending");
    assert_eq!(scenario.rows, 10);

    let mut validator = TtlValidator::new(
        deployment.engine.as_ref(),
        Some(&deployment.cluster),
        deployment.clock.as_ref(),
        &config,
    );
    // Passing here means every child survived past the TTL with exactly
    // its inserted row count, because the writes were never flushed.
    validator.run(&scenario, "db_b").unwrap();
    assert_eq!(validator.state(), ValidatorState::Done);
}

#[test]
fn test_normal_ttl_override_beats_database_default() {
    let config = config();
    let deployment = mock_deployment();
    let scenario = scenario(&config, "normal_override_survives");

    let mut validator = TtlValidator::new(
        deployment.engine.as_ref(),
        Some(&deployment.cluster),
        deployment.clock.as_ref(),
        &config,
    );
    validator.run(&scenario, "db_c").unwrap();
    assert_eq!(validator.state(), ValidatorState::Done);
}

#[test]
fn test_restart_flushes_wal_and_purge_proceeds() {
    let config = config();
    let deployment = mock_deployment();
    let scenario = scenario(&config, "restart_flushes_wal");

    let mut validator = TtlValidator::new(
        deployment.engine.as_ref(),
        Some(&deployment.cluster),
        deployment.clock.as_ref(),
        &config,
    );
    validator.run(&scenario, "db_d").unwrap();
    assert_eq!(validator.state(), ValidatorState::Done);
}

#[test]
fn test_restart_scenario_requires_cluster_collaborator() {
    let config = config();
    let deployment = mock_deployment();
    let scenario = scenario(&config, "restart_flushes_wal");

    let mut validator = TtlValidator::new(
        deployment.engine.as_ref(),
        None,
        deployment.clock.as_ref(),
        &config,
    );
    let err = validator.run(&scenario, "db_e").unwrap_err();
    assert!(matches!(err, HarnessError::Cluster(_)));
    assert_eq!(validator.state(), ValidatorState::Aborted);
}

#[test]
fn test_alter_ttl_rearm_purges_after_expiry() {
    let config = config();
    let deployment = mock_deployment();
    let scenario = scenario(&config, "alter_ttl_rearm");

    let mut validator = TtlValidator::new(
        deployment.engine.as_ref(),
        Some(&deployment.cluster),
        deployment.clock.as_ref(),
        &config,
    );
    validator.run(&scenario, "db_f").unwrap();
    assert_eq!(validator.state(), ValidatorState::Done);
}

#[test]
fn test_full_suite_passes_and_drops_every_database() {
    let config = config();
    let deployment = mock_deployment();
    let report = run_suite(
        deployment.engine.as_ref(),
        Some(&deployment.cluster),
        deployment.clock.as_ref(),
        &config,
    );
    assert!(report.passed(), "failures: {:?}", report.scenarios);
    assert_eq!(report.scenarios.len(), 9);

    // Every scenario database was dropped during cleanup.
    for scenario in &report.scenarios {
        let probe = format!("SHOW TABLES FROM {}", scenario.database);
        assert!(deployment.engine.execute(&probe).is_err());
    }
}

#[test]
fn test_rerun_under_fresh_run_id_yields_same_outcome() {
    let deployment = mock_deployment();
    let first = run_suite(
        deployment.engine.as_ref(),
        Some(&deployment.cluster),
        deployment.clock.as_ref(),
        &config().with_run_id("run1"),
    );
    let second = run_suite(
        deployment.engine.as_ref(),
        Some(&deployment.cluster),
        deployment.clock.as_ref(),
        &config().with_run_id("run2"),
    );
    assert_eq!(first.passed(), second.passed());
    let outcomes = |r: &ebb_harness::SuiteReport| {
        r.scenarios.iter().map(|s| (s.name.clone(), s.passed)).collect::<Vec<_>>()
    };
    assert_eq!(outcomes(&first), outcomes(&second));
}

#[test]
fn test_duplicate_database_aborts_as_setup_failure() {
    let config = config();
    let deployment = mock_deployment();
    deployment.engine.execute("CREATE DATABASE db_dup").unwrap();

    let scenario = scenario(&config, "super_only");
    let mut validator = TtlValidator::new(
        deployment.engine.as_ref(),
        Some(&deployment.cluster),
        deployment.clock.as_ref(),
        &config,
    );
    let err = validator.run(&scenario, "db_dup").unwrap_err();
    assert!(matches!(err, HarnessError::Ddl { .. }));
    assert!(!err.is_assertion());
    assert_eq!(validator.state(), ValidatorState::Aborted);
}

/// An executor that accepts everything but reports every table as gone,
/// so any `Present` expectation must fail.
struct AmnesiacExecutor;

impl SqlExecutor for AmnesiacExecutor {
    fn execute(&self, statement: &str) -> ebb_common::ExecResult {
        let upper = statement.trim().to_ascii_uppercase();
        if upper.starts_with("SHOW") {
            return Ok(ebb_common::QueryResult::names("table_name", vec![]));
        }
        Ok(ebb_common::QueryResult::affected(0))
    }
}

#[test]
fn test_unmet_expectation_is_bounded_assertion_failure() {
    let config = config().with_poll(PollPolicy {
        max_attempts: 3,
        initial_backoff_ms: 1,
        max_backoff_ms: 2,
    });
    let deployment = mock_deployment();
    let executor = AmnesiacExecutor;
    let scenario = scenario(&config, "super_only");

    let mut validator = TtlValidator::new(
        &executor,
        None,
        deployment.clock.as_ref(),
        &config,
    );
    // The super table must persist, but this executor reports it gone on
    // all three polls; the bounded poll fails instead of hanging.
    let err = validator.run(&scenario, "db_gone").unwrap_err();
    match &err {
        HarnessError::Assertion(failure) => {
            assert_eq!(failure.mismatches.len(), 1);
            assert_eq!(failure.mismatches[0].table, "stb1");
            assert_eq!(failure.mismatches[0].observed, "absent");
        }
        other => panic!("expected assertion failure, got {other:?}"),
    }
    assert!(err.is_assertion());
}
