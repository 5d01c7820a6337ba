use std::time::Duration;

use async_nats::jetstream::{self, stream};
use heartbeat_common::nats_config::StreamConfig;
use heartbeat_common::retry::{retry_async, Backoff};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// JetStream settings for the report and usage event stream.
pub fn stream_settings(config: &StreamConfig) -> stream::Config {
    stream::Config {
        name: config.name.clone(),
        subjects: config.subjects.clone(),
        max_bytes: config.max_bytes,
        max_age: Duration::from_secs(config.max_age_secs),
        num_replicas: config.num_replicas.max(1),
        retention: stream::RetentionPolicy::Limits,
        discard: stream::DiscardPolicy::Old,
        ..Default::default()
    }
}

/// Connects to NATS and makes sure the heartbeat event stream exists.
pub async fn open_event_stream(
    url: &str,
    config: &StreamConfig,
    backoff: &Backoff,
) -> Result<jetstream::Context, BoxError> {
    let client = retry_async(backoff, "nats connect", || async_nats::connect(url)).await?;
    let js = jetstream::new(client);
    let mut declared = js.get_or_create_stream(stream_settings(config)).await?;
    let info = declared.info().await?;
    tracing::info!(
        stream = %config.name,
        subjects = ?config.subjects,
        messages = info.state.messages,
        "heartbeat event stream ready"
    );
    Ok(js)
}
