use std::sync::Arc;

use chrono::Utc;
use heartbeat_common::report::Report;
use heartbeat_notify::{DispatchOutcome, Dispatcher, Notification, ReportRecord};
use uuid::Uuid;

use crate::clients::BillingClient;
use crate::config::NotificationsConfig;

/// Stamps reports and hands them to the notification fan-out.
pub struct Reporter {
    billing: Arc<dyn BillingClient>,
    dispatcher: Dispatcher,
    webapp_url: String,
    notifications: NotificationsConfig,
}

impl Reporter {
    pub fn new(
        billing: Arc<dyn BillingClient>,
        dispatcher: Dispatcher,
        webapp_url: impl Into<String>,
        notifications: NotificationsConfig,
    ) -> Self {
        Self {
            billing,
            dispatcher,
            webapp_url: webapp_url.into(),
            notifications,
        }
    }

    pub fn report_url(&self, report_id: &str) -> String {
        let base = self.webapp_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return String::new();
        }
        format!("{base}/reports?report={report_id}")
    }

    pub async fn send(&self, tenant_id: &str, report: Report) -> (ReportRecord, DispatchOutcome) {
        let record = ReportRecord::from_report(
            Uuid::new_v4().to_string(),
            tenant_id,
            report,
            Utc::now(),
        );
        let mut notification = Notification::new(record.clone());
        notification.report_url = self.report_url(&record.id);
        notification.preferences = self.notifications.for_tenant(tenant_id);

        match self.billing.billing_status(tenant_id).await {
            Ok(status) => {
                notification.recipient_email = status.billing_email;
                notification.tenant_name = status.billing_company;
            }
            Err(e) => {
                tracing::warn!(tenant_id = %tenant_id, stage = "recipient_lookup", error = %e, "billing lookup failed, sending without recipient");
            }
        }

        let outcome = self.dispatcher.dispatch(&notification).await;
        if let Some(e) = &outcome.first_error {
            tracing::warn!(
                tenant_id = %tenant_id,
                report_id = %record.id,
                failed = outcome.failed.len(),
                error = %e,
                "report delivered with channel failures"
            );
        } else {
            tracing::info!(
                tenant_id = %tenant_id,
                report_id = %record.id,
                channels = outcome.delivered.len(),
                "report delivered"
            );
        }
        (record, outcome)
    }
}
