use async_nats::jetstream;
use async_trait::async_trait;
use heartbeat_common::nats_config::report_subject;

use super::event::LiveUpdateEvent;
use super::publisher::{LiveUpdatePublisher, PublishError};

pub struct NatsLiveUpdatePublisher {
    js: jetstream::Context,
}

impl NatsLiveUpdatePublisher {
    pub fn new(js: jetstream::Context) -> Self {
        Self { js }
    }
}

#[async_trait]
impl LiveUpdatePublisher for NatsLiveUpdatePublisher {
    async fn publish(&self, event: &LiveUpdateEvent) -> Result<(), PublishError> {
        let subject = report_subject(&event.tenant_id);
        let payload = serde_json::to_vec(event).map_err(|e| PublishError(e.to_string()))?;

        let mut headers = async_nats::HeaderMap::new();
        headers.insert("X-Tenant-Id", event.tenant_id.as_str());
        headers.insert("X-Resource-Id", event.resource_id.as_str());

        self.js
            .publish_with_headers(subject, headers, payload.into())
            .await
            .map_err(|e| PublishError(e.to_string()))?
            .await
            .map_err(|e| PublishError(e.to_string()))?;

        Ok(())
    }
}
