use async_trait::async_trait;

use super::error::ClientError;
use super::http::HttpJson;
use super::types::BillingStatus;

#[async_trait]
pub trait BillingClient: Send + Sync {
    async fn billing_status(&self, tenant_id: &str) -> Result<BillingStatus, ClientError>;
}

pub struct HttpBillingClient {
    http: HttpJson,
}

impl HttpBillingClient {
    pub fn new(http: HttpJson) -> Self {
        Self { http }
    }
}

#[async_trait]
impl BillingClient for HttpBillingClient {
    async fn billing_status(&self, tenant_id: &str) -> Result<BillingStatus, ClientError> {
        self.http
            .get(&["v1", "tenants", tenant_id, "billing", "status"], &[])
            .await
    }
}
