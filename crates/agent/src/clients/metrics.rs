use async_trait::async_trait;
use heartbeat_common::snapshot::{ClientQoeSummary, HealthSummary, StreamHealthPage};
use serde::Deserialize;

use super::error::ClientError;
use super::http::HttpJson;
use super::types::{FederationSummary, LiveNode, NodePerformanceRecord, PlatformOverview, TimeRange};

/// Read access to the analytics service.
#[async_trait]
pub trait MetricsClient: Send + Sync {
    async fn health_summary(
        &self,
        tenant_id: &str,
        range: &TimeRange,
    ) -> Result<Option<HealthSummary>, ClientError>;

    async fn client_qoe_summary(
        &self,
        tenant_id: &str,
        range: &TimeRange,
    ) -> Result<Option<ClientQoeSummary>, ClientError>;

    async fn platform_overview(&self, tenant_id: &str) -> Result<PlatformOverview, ClientError>;

    async fn stream_health_metrics(
        &self,
        tenant_id: &str,
        range: &TimeRange,
        first: u32,
        after: Option<&str>,
    ) -> Result<StreamHealthPage, ClientError>;

    async fn federation_summary(
        &self,
        tenant_id: &str,
        range: &TimeRange,
    ) -> Result<Option<FederationSummary>, ClientError>;

    async fn live_nodes(&self, tenant_id: &str) -> Result<Vec<LiveNode>, ClientError>;

    async fn node_performance_5m(
        &self,
        tenant_id: &str,
        node_id: &str,
        range: &TimeRange,
    ) -> Result<Vec<NodePerformanceRecord>, ClientError>;
}

#[derive(Deserialize)]
struct SummaryEnvelope<T> {
    #[serde(default)]
    summary: Option<T>,
}

#[derive(Deserialize)]
struct NodesEnvelope {
    #[serde(default)]
    nodes: Vec<LiveNode>,
}

#[derive(Deserialize)]
struct RecordsEnvelope {
    #[serde(default)]
    records: Vec<NodePerformanceRecord>,
}

pub struct HttpMetricsClient {
    http: HttpJson,
}

impl HttpMetricsClient {
    pub fn new(http: HttpJson) -> Self {
        Self { http }
    }
}

#[async_trait]
impl MetricsClient for HttpMetricsClient {
    async fn health_summary(
        &self,
        tenant_id: &str,
        range: &TimeRange,
    ) -> Result<Option<HealthSummary>, ClientError> {
        let env: SummaryEnvelope<HealthSummary> = self
            .http
            .get(&["v1", "tenants", tenant_id, "stream-health", "summary"], &range.query())
            .await?;
        Ok(env.summary)
    }

    async fn client_qoe_summary(
        &self,
        tenant_id: &str,
        range: &TimeRange,
    ) -> Result<Option<ClientQoeSummary>, ClientError> {
        let env: SummaryEnvelope<ClientQoeSummary> = self
            .http
            .get(&["v1", "tenants", tenant_id, "client-qoe", "summary"], &range.query())
            .await?;
        Ok(env.summary)
    }

    async fn platform_overview(&self, tenant_id: &str) -> Result<PlatformOverview, ClientError> {
        self.http
            .get(&["v1", "tenants", tenant_id, "platform", "overview"], &[])
            .await
    }

    async fn stream_health_metrics(
        &self,
        tenant_id: &str,
        range: &TimeRange,
        first: u32,
        after: Option<&str>,
    ) -> Result<StreamHealthPage, ClientError> {
        let mut query = range.query();
        query.push(("first", first.to_string()));
        if let Some(cursor) = after {
            query.push(("after", cursor.to_string()));
        }
        self.http
            .get(&["v1", "tenants", tenant_id, "stream-health", "metrics"], &query)
            .await
    }

    async fn federation_summary(
        &self,
        tenant_id: &str,
        range: &TimeRange,
    ) -> Result<Option<FederationSummary>, ClientError> {
        let env: SummaryEnvelope<FederationSummary> = self
            .http
            .get(&["v1", "tenants", tenant_id, "federation", "summary"], &range.query())
            .await?;
        Ok(env.summary)
    }

    async fn live_nodes(&self, tenant_id: &str) -> Result<Vec<LiveNode>, ClientError> {
        let env: NodesEnvelope = self
            .http
            .get(&["v1", "tenants", tenant_id, "nodes", "live"], &[])
            .await?;
        Ok(env.nodes)
    }

    async fn node_performance_5m(
        &self,
        tenant_id: &str,
        node_id: &str,
        range: &TimeRange,
    ) -> Result<Vec<NodePerformanceRecord>, ClientError> {
        let env: RecordsEnvelope = self
            .http
            .get(
                &["v1", "tenants", tenant_id, "nodes", node_id, "performance-5m"],
                &range.query(),
            )
            .await?;
        Ok(env.records)
    }
}
