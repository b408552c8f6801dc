//! EbbDB retention suite runner.
//!
//! The `ttlcheck` binary runs the full TTL scenario matrix against the
//! in-process mock deployment and reports per-scenario pass/fail:
//!
//! ```bash
//! # Run with defaults
//! ttlcheck
//!
//! # Pin the seed and emit the JSON report
//! ttlcheck --seed 7 --json
//!
//! # Heavier topology
//! ttlcheck --children 100 --rows 50
//! ```

use anyhow::{bail, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ebb_common::RunConfig;
use ebb_harness::run_suite;
use ebb_test::utils::mock_deployment;

/// EbbDB retention suite runner.
#[derive(Parser, Debug)]
#[command(
    name = "ttlcheck",
    version,
    about = "Runs the EbbDB TTL scenario matrix against an in-process mock deployment"
)]
struct Args {
    /// Seed for dataset generation
    #[arg(long, default_value_t = 42, env = "EBB_SEED")]
    seed: u64,

    /// Run identifier embedded in database names
    #[arg(long, default_value = "local")]
    run_id: String,

    /// Rows inserted per populated table
    #[arg(long, default_value_t = 10)]
    rows: usize,

    /// Child tables per super table
    #[arg(long, default_value_t = 20)]
    children: usize,

    /// Emit the full JSON report instead of a summary
    #[arg(long)]
    json: bool,

    /// Log filter (overrides EBB_LOG)
    #[arg(long, default_value = "info", env = "EBB_LOG")]
    log: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&args.log))
        .init();

    let config = RunConfig::default()
        .with_seed(args.seed)
        .with_run_id(args.run_id.clone())
        .with_rows(args.rows)
        .with_child_count(args.children);
    if let Err(reason) = config.validate() {
        bail!("invalid configuration: {reason}");
    }

    info!(seed = args.seed, run_id = args.run_id, "starting suite");
    let deployment = mock_deployment();
    let report = run_suite(
        deployment.engine.as_ref(),
        Some(&deployment.cluster),
        deployment.clock.as_ref(),
        &config,
    );

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        for scenario in &report.scenarios {
            let status = if scenario.passed { "PASS" } else { "FAIL" };
            println!("{status}  {:<28} {}ms", scenario.name, scenario.elapsed_ms);
            if let Some(failure) = &scenario.failure {
                println!("      {failure}");
            }
        }
        println!(
            "{} scenarios, {} failed (seed {})",
            report.scenarios.len(),
            report.failed_count(),
            report.seed
        );
    }

    if !report.passed() {
        bail!("{} scenario(s) failed", report.failed_count());
    }
    Ok(())
}
