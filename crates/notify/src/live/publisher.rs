use std::sync::Arc;

use async_trait::async_trait;

use super::event::LiveUpdateEvent;
use crate::channel::{ChannelKind, Notifier, NotifyError};
use crate::notification::Notification;

#[async_trait]
pub trait LiveUpdatePublisher: Send + Sync {
    async fn publish(&self, event: &LiveUpdateEvent) -> Result<(), PublishError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublishError(pub String);

impl std::fmt::Display for PublishError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "publish: {}", self.0)
    }
}

impl std::error::Error for PublishError {}

pub struct LiveUpdateNotifier {
    publisher: Arc<dyn LiveUpdatePublisher>,
}

impl LiveUpdateNotifier {
    pub fn new(publisher: Arc<dyn LiveUpdatePublisher>) -> Self {
        Self { publisher }
    }
}

#[async_trait]
impl Notifier for LiveUpdateNotifier {
    fn name(&self) -> &str {
        "live_update"
    }

    fn kind(&self) -> ChannelKind {
        ChannelKind::LiveUpdate
    }

    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let event = LiveUpdateEvent::report(
            notification.tenant_id(),
            notification.report_id(),
            notification.generated_at(),
        );
        self.publisher
            .publish(&event)
            .await
            .map_err(|e| NotifyError(e.to_string()))
    }
}
