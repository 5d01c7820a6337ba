use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::metrics::HeartbeatMetrics;

#[derive(Debug, Clone)]
pub struct AgentState {
    metrics: Arc<HeartbeatMetrics>,
    ready: Arc<AtomicBool>,
}

impl AgentState {
    pub fn new(metrics: Arc<HeartbeatMetrics>) -> Self {
        Self {
            metrics,
            ready: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn metrics(&self) -> &Arc<HeartbeatMetrics> {
        &self.metrics
    }

    pub fn set_ready(&self, v: bool) {
        self.ready.store(v, Ordering::Relaxed);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Relaxed)
    }
}

impl Default for AgentState {
    fn default() -> Self {
        Self::new(HeartbeatMetrics::new())
    }
}
