use std::sync::Arc;

use async_nats::jetstream;
use async_trait::async_trait;
use heartbeat_common::nats_config::usage_subject;
use heartbeat_notify::PublishError;
use tokio::sync::Mutex;

use super::event::UsageEvent;

#[async_trait]
pub trait UsageSink: Send + Sync {
    async fn send_usage(&self, event: &UsageEvent) -> Result<(), PublishError>;
}

pub struct NatsUsageSink {
    js: jetstream::Context,
}

impl NatsUsageSink {
    pub fn new(js: jetstream::Context) -> Self {
        Self { js }
    }
}

#[async_trait]
impl UsageSink for NatsUsageSink {
    async fn send_usage(&self, event: &UsageEvent) -> Result<(), PublishError> {
        let subject = usage_subject(&event.tenant_id);
        let payload = serde_json::to_vec(event).map_err(|e| PublishError(e.to_string()))?;

        let mut headers = async_nats::HeaderMap::new();
        headers.insert("X-Tenant-Id", event.tenant_id.as_str());
        headers.insert("X-Operation", event.operation.as_str());

        self.js
            .publish_with_headers(subject, headers, payload.into())
            .await
            .map_err(|e| PublishError(e.to_string()))?
            .await
            .map_err(|e| PublishError(e.to_string()))?;

        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryUsageSink {
    events: Arc<Mutex<Vec<UsageEvent>>>,
}

impl InMemoryUsageSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<UsageEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl UsageSink for InMemoryUsageSink {
    async fn send_usage(&self, event: &UsageEvent) -> Result<(), PublishError> {
        self.events.lock().await.push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::TokenCounts;
    use std::time::Duration;

    #[tokio::test]
    async fn in_memory_sink_records_events() {
        let sink = InMemoryUsageSink::new();
        let ev = UsageEvent::investigation("t1", TokenCounts { input: 5, output: 5 }, Duration::ZERO, false);
        sink.send_usage(&ev).await.unwrap();
        sink.send_usage(&ev).await.unwrap();

        let events = sink.events().await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].tenant_id, "t1");
    }
}
