//! Suite running and reporting.
//!
//! [`run_suite`] drives the full scenario matrix, one fresh database per
//! scenario, and collects a serializable [`SuiteReport`] for the external
//! dispatch mechanism. A scenario failure never stops the suite; every
//! scenario reports independently.

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use ebb_common::{Clock, ClusterControl, RunConfig, SqlExecutor};

use crate::scenario::Scenario;
use crate::validator::TtlValidator;

/// Outcome of one scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Scenario name.
    pub name: String,
    /// Database the scenario ran in.
    pub database: String,
    /// Whether every expectation held.
    pub passed: bool,
    /// Failure description when `passed` is false.
    pub failure: Option<String>,
    /// True when the failure was an unmet TTL expectation rather than a
    /// setup error.
    pub assertion_failure: bool,
    /// Wall time spent, in milliseconds.
    pub elapsed_ms: u64,
}

/// Outcome of one full run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Run identifier.
    pub run_id: String,
    /// Seed the run was generated with.
    pub seed: u64,
    /// Per-scenario outcomes, in execution order.
    pub scenarios: Vec<ScenarioReport>,
}

impl SuiteReport {
    /// True when every scenario passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.scenarios.iter().all(|s| s.passed)
    }

    /// Number of failed scenarios.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.scenarios.iter().filter(|s| !s.passed).count()
    }

    /// Serializes the report as pretty JSON.
    ///
    /// # Errors
    ///
    /// Propagates `serde_json` serialization failures.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Runs the full scenario matrix against a deployment.
pub fn run_suite(
    executor: &dyn SqlExecutor,
    cluster: Option<&dyn ClusterControl>,
    clock: &dyn Clock,
    config: &RunConfig,
) -> SuiteReport {
    let scenarios = Scenario::suite(config);
    let mut reports = Vec::with_capacity(scenarios.len());
    for (index, scenario) in scenarios.iter().enumerate() {
        let database = config.database_name(index);
        let started = clock.now_ms();
        let mut validator = TtlValidator::new(executor, cluster, clock, config);
        let result = validator.run(scenario, &database);
        let elapsed_ms = clock.now_ms().saturating_sub(started).max(0) as u64;
        let report = match result {
            Ok(()) => {
                info!(scenario = scenario.name, elapsed_ms, "scenario passed");
                ScenarioReport {
                    name: scenario.name.clone(),
                    database,
                    passed: true,
                    failure: None,
                    assertion_failure: false,
                    elapsed_ms,
                }
            }
            Err(err) => {
                error!(scenario = scenario.name, error = %err, "scenario failed");
                ScenarioReport {
                    name: scenario.name.clone(),
                    database,
                    passed: false,
                    assertion_failure: err.is_assertion(),
                    failure: Some(err.to_string()),
                    elapsed_ms,
                }
            }
        };
        reports.push(report);
    }
    SuiteReport {
        run_id: config.run_id.clone(),
        seed: config.seed,
        scenarios: reports,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_serializes_round_trip() {
        let report = SuiteReport {
            run_id: "r1".to_string(),
            seed: 42,
            scenarios: vec![ScenarioReport {
                name: "super_only".to_string(),
                database: "ttl_db_r1_00".to_string(),
                passed: true,
                failure: None,
                assertion_failure: false,
                elapsed_ms: 3_100,
            }],
        };
        let json = report.to_json().unwrap();
        let parsed: SuiteReport = serde_json::from_str(&json).unwrap();
        assert!(parsed.passed());
        assert_eq!(parsed.failed_count(), 0);
        assert_eq!(parsed.scenarios[0].name, "super_only");
    }
}
