use std::time::Duration;

use async_nats::jetstream::consumer::{pull, AckPolicy, PullConsumer};
use async_nats::jetstream::{self, Message};
use futures::StreamExt;
use heartbeat_common::nats_config::StreamConfig;
use tokio::sync::watch;

use super::trigger::LookoutTrigger;
use crate::config::LookoutConfig;
use crate::messaging::stream_settings;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const IDLE_BACKOFF: Duration = Duration::from_millis(100);
const ERROR_BACKOFF: Duration = Duration::from_secs(2);
const MAX_DELIVER: i64 = 5;

pub fn consumer_settings(config: &LookoutConfig) -> pull::Config {
    pull::Config {
        durable_name: Some(config.durable.clone()),
        filter_subject: config.subject.clone(),
        ack_policy: AckPolicy::Explicit,
        max_deliver: MAX_DELIVER,
        ..Default::default()
    }
}

/// Binds the durable pull consumer, declaring the incident stream if needed.
pub async fn create_lookout_consumer(
    js: &jetstream::Context,
    config: &LookoutConfig,
) -> Result<PullConsumer, BoxError> {
    let stream_config = StreamConfig::lookout(&config.stream, &config.subject);
    let stream = js.get_or_create_stream(stream_settings(&stream_config)).await?;
    let consumer = stream
        .get_or_create_consumer(&config.durable, consumer_settings(config))
        .await?;
    tracing::info!(
        stream = %config.stream,
        subject = %config.subject,
        durable = %config.durable,
        "lookout consumer bound"
    );
    Ok(consumer)
}

async fn pull_batch(consumer: &PullConsumer, max_messages: usize) -> Result<Vec<Message>, BoxError> {
    let mut messages = consumer.fetch().max_messages(max_messages).messages().await?;
    let mut batch = Vec::with_capacity(max_messages);
    while let Some(Ok(msg)) = messages.next().await {
        batch.push(msg);
    }
    Ok(batch)
}

pub struct LookoutConsumer {
    consumer: PullConsumer,
    trigger: LookoutTrigger,
    batch_size: usize,
}

impl LookoutConsumer {
    pub fn new(consumer: PullConsumer, trigger: LookoutTrigger, batch_size: usize) -> Self {
        Self {
            consumer,
            trigger,
            batch_size: batch_size.max(1),
        }
    }

    /// Pulls and handles incidents until `shutdown` flips or its sender drops.
    /// Every message is acked once handled, whatever the outcome.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(batch_size = self.batch_size, "lookout consumer started");
        loop {
            if *shutdown.borrow() {
                break;
            }
            let pulled = tokio::select! {
                pulled = pull_batch(&self.consumer, self.batch_size) => pulled,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            };

            let messages = match pulled {
                Ok(messages) => messages,
                Err(e) => {
                    tracing::warn!(error = %e, "lookout pull failed");
                    tokio::time::sleep(ERROR_BACKOFF).await;
                    continue;
                }
            };
            if messages.is_empty() {
                tokio::time::sleep(IDLE_BACKOFF).await;
                continue;
            }

            for msg in messages {
                let outcome = self.trigger.handle(msg.payload.as_ref()).await;
                tracing::debug!(subject = %msg.subject, outcome = ?outcome, "lookout incident handled");
                if let Err(e) = msg.ack().await {
                    tracing::error!(error = %e, "lookout ack failed");
                }
            }
        }
        tracing::info!("lookout consumer stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consumer_is_durable_and_filtered() {
        let cfg = LookoutConfig {
            subject: "lookout.incidents.eu".into(),
            ..Default::default()
        };
        let c = consumer_settings(&cfg);
        assert_eq!(c.durable_name.as_deref(), Some("heartbeat-lookout"));
        assert_eq!(c.filter_subject, "lookout.incidents.eu");
        assert_eq!(c.ack_policy, AckPolicy::Explicit);
        assert_eq!(c.max_deliver, 5);
    }
}
