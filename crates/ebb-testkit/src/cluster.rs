//! Mock cluster lifecycle handle.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use ebb_common::{ClusterControl, ClusterError};

use crate::engine::MockEbb;

/// A cluster handle over a [`MockEbb`]; restarting it flushes every
/// database's WAL-pending writes, as a real node restart would.
pub struct MockCluster {
    engine: Arc<MockEbb>,
    stopped: Mutex<HashSet<u32>>,
}

impl MockCluster {
    /// Binds a cluster handle to an engine.
    #[must_use]
    pub fn new(engine: Arc<MockEbb>) -> Self {
        Self { engine, stopped: Mutex::new(HashSet::new()) }
    }

    /// True when `node_id` is currently stopped.
    #[must_use]
    pub fn is_stopped(&self, node_id: u32) -> bool {
        self.stopped.lock().contains(&node_id)
    }
}

impl ClusterControl for MockCluster {
    fn stop_node(&self, node_id: u32) -> Result<(), ClusterError> {
        let mut stopped = self.stopped.lock();
        if !stopped.insert(node_id) {
            return Err(ClusterError::new("stop", format!("node {node_id} already stopped")));
        }
        debug!(node_id, "node stopped");
        Ok(())
    }

    fn start_node(&self, node_id: u32) -> Result<(), ClusterError> {
        let mut stopped = self.stopped.lock();
        if !stopped.remove(&node_id) {
            return Err(ClusterError::new("start", format!("node {node_id} is not stopped")));
        }
        // Coming back up replays and persists the node's WAL.
        self.engine.flush_all();
        debug!(node_id, "node started");
        Ok(())
    }

    fn restart(&self) -> Result<(), ClusterError> {
        if !self.stopped.lock().is_empty() {
            return Err(ClusterError::new("restart", "cannot restart with nodes stopped"));
        }
        self.engine.flush_all();
        debug!("cluster restarted");
        Ok(())
    }
}
