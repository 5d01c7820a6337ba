use std::sync::Arc;

use async_trait::async_trait;

use super::config::SmtpConfig;
use super::render::{render_report, report_subject};
use super::transport::{MailTransport, SmtpTransport};
use crate::channel::{ChannelKind, Notifier, NotifyError};
use crate::notification::Notification;

pub struct EmailNotifier {
    transport: Option<Arc<dyn MailTransport>>,
}

impl EmailNotifier {
    /// Builds an SMTP-backed notifier, or an inert one when SMTP is not configured.
    pub fn from_config(config: &SmtpConfig) -> Result<Self, NotifyError> {
        if !config.is_configured() {
            return Ok(Self { transport: None });
        }
        Ok(Self {
            transport: Some(Arc::new(SmtpTransport::new(config)?)),
        })
    }

    pub fn with_transport(transport: Arc<dyn MailTransport>) -> Self {
        Self {
            transport: Some(transport),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.transport.is_some()
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &str {
        "email"
    }

    fn kind(&self) -> ChannelKind {
        ChannelKind::Email
    }

    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let Some(transport) = &self.transport else {
            tracing::warn!(
                tenant_id = %notification.tenant_id(),
                "email notifier not configured, skipping report email"
            );
            return Ok(());
        };

        let to = notification.recipient_email.trim();
        if to.is_empty() {
            tracing::warn!(
                tenant_id = %notification.tenant_id(),
                report_id = %notification.report_id(),
                "no recipient email, skipping report email"
            );
            return Ok(());
        }

        let subject = report_subject(notification.report_id());
        transport
            .send_html(to, &subject, render_report(notification))
            .await?;

        tracing::info!(
            tenant_id = %notification.tenant_id(),
            report_id = %notification.report_id(),
            "report email sent"
        );
        Ok(())
    }
}
