use std::time::Duration;

use chrono::{DateTime, Utc};
use heartbeat_common::nats_config::SOURCE_TAG;
use serde::{Deserialize, Serialize};

use crate::clients::TokenCounts;

pub const INVESTIGATION_OPERATION: &str = "heartbeat_investigation";

/// Billable record emitted once per investigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageEvent {
    pub tenant_id: String,
    pub operation: String,
    pub request_count: u64,
    pub error_count: u64,
    pub complexity: u64,
    pub duration_ms: u64,
    pub timestamp: DateTime<Utc>,
    pub source: String,
}

impl UsageEvent {
    pub fn investigation(
        tenant_id: &str,
        tokens: TokenCounts,
        elapsed: Duration,
        failed: bool,
    ) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            operation: INVESTIGATION_OPERATION.to_string(),
            request_count: 1,
            error_count: u64::from(failed),
            complexity: tokens.total(),
            duration_ms: elapsed.as_millis() as u64,
            timestamp: Utc::now(),
            source: SOURCE_TAG.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complexity_is_total_tokens() {
        let ev = UsageEvent::investigation(
            "t1",
            TokenCounts { input: 1200, output: 300 },
            Duration::from_millis(2500),
            false,
        );
        assert_eq!(ev.complexity, 1500);
        assert_eq!(ev.request_count, 1);
        assert_eq!(ev.error_count, 0);
        assert_eq!(ev.duration_ms, 2500);
        assert_eq!(ev.source, "heartbeat");
        assert_eq!(ev.operation, "heartbeat_investigation");
    }

    #[test]
    fn failed_investigation_counts_one_error() {
        let ev = UsageEvent::investigation("t1", TokenCounts::default(), Duration::ZERO, true);
        assert_eq!(ev.error_count, 1);
        assert_eq!(ev.complexity, 0);
    }
}
