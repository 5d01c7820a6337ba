mod event;
mod in_memory;
mod nats_publisher;
mod publisher;

pub use event::{LiveUpdateEvent, REPORT_RESOURCE_TYPE};
pub use in_memory::InMemoryLiveUpdatePublisher;
pub use nats_publisher::NatsLiveUpdatePublisher;
pub use publisher::{LiveUpdateNotifier, LiveUpdatePublisher, PublishError};
