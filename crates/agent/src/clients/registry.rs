use async_trait::async_trait;
use serde::Deserialize;

use super::error::ClientError;
use super::http::HttpJson;
use super::types::{ClusterPage, NodeOwner};

/// Tenant and cluster directory.
#[async_trait]
pub trait TenantRegistry: Send + Sync {
    async fn list_active_tenants(&self) -> Result<Vec<String>, ClientError>;

    async fn list_clusters(&self, first: u32, after: Option<&str>) -> Result<ClusterPage, ClientError>;

    async fn node_owner(&self, node_id: &str) -> Result<NodeOwner, ClientError>;
}

#[derive(Deserialize)]
struct TenantsEnvelope {
    #[serde(default)]
    tenant_ids: Vec<String>,
}

pub struct HttpTenantRegistry {
    http: HttpJson,
}

impl HttpTenantRegistry {
    pub fn new(http: HttpJson) -> Self {
        Self { http }
    }
}

#[async_trait]
impl TenantRegistry for HttpTenantRegistry {
    async fn list_active_tenants(&self) -> Result<Vec<String>, ClientError> {
        let env: TenantsEnvelope = self.http.get(&["v1", "tenants", "active"], &[]).await?;
        Ok(env.tenant_ids)
    }

    async fn list_clusters(&self, first: u32, after: Option<&str>) -> Result<ClusterPage, ClientError> {
        let mut query = vec![("first", first.to_string())];
        if let Some(cursor) = after {
            query.push(("after", cursor.to_string()));
        }
        self.http.get(&["v1", "clusters"], &query).await
    }

    async fn node_owner(&self, node_id: &str) -> Result<NodeOwner, ClientError> {
        self.http.get(&["v1", "nodes", node_id, "owner"], &[]).await
    }
}
