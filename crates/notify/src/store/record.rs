use chrono::{DateTime, Utc};
use heartbeat_common::report::{Recommendation, Report};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub id: String,
    pub tenant_id: String,
    pub trigger: String,
    pub summary: String,
    pub metrics_reviewed: Vec<String>,
    pub root_cause: String,
    pub recommendations: Vec<Recommendation>,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

impl ReportRecord {
    pub fn from_report(id: String, tenant_id: &str, report: Report, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            tenant_id: tenant_id.to_string(),
            trigger: report.trigger,
            summary: report.summary,
            metrics_reviewed: report.metrics_reviewed,
            root_cause: report.root_cause,
            recommendations: report.recommendations,
            created_at,
            read_at: None,
        }
    }

    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }
}
