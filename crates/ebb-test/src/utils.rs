//! Shared fixtures for the integration tests and the runner binary.

use std::sync::{Arc, Once};

use tracing_subscriber::EnvFilter;

use ebb_testkit::{MockClock, MockCluster, MockEbb};

static INIT_LOGGING: Once = Once::new();

/// Installs the tracing subscriber once, honoring `EBB_LOG`.
pub fn init_logging() {
    INIT_LOGGING.call_once(|| {
        let filter = EnvFilter::try_from_env("EBB_LOG")
            .unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// A complete in-process mock deployment.
pub struct MockDeployment {
    /// Simulated clock shared by the engine and the validator.
    pub clock: Arc<MockClock>,
    /// The mock engine.
    pub engine: Arc<MockEbb>,
    /// Cluster handle over the engine.
    pub cluster: MockCluster,
}

/// Wires up a fresh engine, clock, and cluster handle.
#[must_use]
pub fn mock_deployment() -> MockDeployment {
    let clock = Arc::new(MockClock::default());
    let engine = Arc::new(MockEbb::new(clock.clone()));
    let cluster = MockCluster::new(engine.clone());
    MockDeployment { clock, engine, cluster }
}
