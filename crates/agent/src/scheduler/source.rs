use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use heartbeat_common::snapshot::StreamHealthPage;
use heartbeat_diagnostics::per_stream::BoxError;
use heartbeat_diagnostics::StreamMetricsSource;

use crate::clients::{MetricsClient, TimeRange};

/// Serves per-stream pages from the metrics service over the window ending now.
pub struct MetricsStreamSource {
    metrics: Arc<dyn MetricsClient>,
}

impl MetricsStreamSource {
    pub fn new(metrics: Arc<dyn MetricsClient>) -> Self {
        Self { metrics }
    }
}

#[async_trait]
impl StreamMetricsSource for MetricsStreamSource {
    async fn stream_health_page(
        &self,
        tenant_id: &str,
        window: Duration,
        first: u32,
        after: Option<&str>,
    ) -> Result<StreamHealthPage, BoxError> {
        let range = TimeRange::last(window);
        Ok(self
            .metrics
            .stream_health_metrics(tenant_id, &range, first, after)
            .await?)
    }
}
