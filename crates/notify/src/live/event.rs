use chrono::{DateTime, Utc};
use heartbeat_common::nats_config::SOURCE_TAG;
use serde::{Deserialize, Serialize};

pub const REPORT_RESOURCE_TYPE: &str = "heartbeat_report";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveUpdateEvent {
    pub tenant_id: String,
    pub resource_type: String,
    pub resource_id: String,
    pub timestamp: DateTime<Utc>,
    pub source: String,
}

impl LiveUpdateEvent {
    pub fn report(tenant_id: &str, report_id: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            resource_type: REPORT_RESOURCE_TYPE.to_string(),
            resource_id: report_id.to_string(),
            timestamp,
            source: SOURCE_TAG.to_string(),
        }
    }
}
