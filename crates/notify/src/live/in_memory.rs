use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::event::LiveUpdateEvent;
use super::publisher::{LiveUpdatePublisher, PublishError};

#[derive(Clone)]
pub struct InMemoryLiveUpdatePublisher {
    events: Arc<Mutex<Vec<LiveUpdateEvent>>>,
    count: Arc<AtomicUsize>,
}

impl Default for InMemoryLiveUpdatePublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLiveUpdatePublisher {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn published_count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    pub async fn published_events(&self) -> Vec<LiveUpdateEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl LiveUpdatePublisher for InMemoryLiveUpdatePublisher {
    async fn publish(&self, event: &LiveUpdateEvent) -> Result<(), PublishError> {
        self.events.lock().await.push(event.clone());
        self.count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
