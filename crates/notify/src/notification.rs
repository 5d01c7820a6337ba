use chrono::{DateTime, Utc};
use heartbeat_common::report::Recommendation;

use crate::preferences::NotificationPreferences;
use crate::store::ReportRecord;

/// A report plus the delivery context every channel needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub record: ReportRecord,
    pub tenant_name: String,
    pub recipient_email: String,
    pub report_url: String,
    pub preferences: NotificationPreferences,
}

impl Notification {
    pub fn new(record: ReportRecord) -> Self {
        Self {
            record,
            tenant_name: String::new(),
            recipient_email: String::new(),
            report_url: String::new(),
            preferences: NotificationPreferences::default(),
        }
    }

    pub fn tenant_id(&self) -> &str {
        &self.record.tenant_id
    }

    pub fn report_id(&self) -> &str {
        &self.record.id
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.record.created_at
    }

    /// Metric names with blanks dropped.
    pub fn metrics(&self) -> impl Iterator<Item = &str> {
        self.record
            .metrics_reviewed
            .iter()
            .map(|m| m.trim())
            .filter(|m| !m.is_empty())
    }

    pub fn recommendations(&self) -> impl Iterator<Item = &Recommendation> {
        self.record
            .recommendations
            .iter()
            .filter(|r| !r.text.trim().is_empty())
    }
}
