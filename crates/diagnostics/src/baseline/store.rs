use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::Baseline;

pub type BaselineMap = BTreeMap<String, Baseline>;

#[derive(Debug)]
pub enum BaselineError {
    Sql(String),
    Store(String),
}

impl std::fmt::Display for BaselineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sql(e) => write!(f, "baseline sql: {e}"),
            Self::Store(e) => write!(f, "baseline store: {e}"),
        }
    }
}

impl std::error::Error for BaselineError {}

impl From<sqlx::Error> for BaselineError {
    fn from(e: sqlx::Error) -> Self {
        Self::Sql(e.to_string())
    }
}

/// Persistence for baselines keyed by (tenant, stream key, metric).
///
/// The stream key is empty for tenant-wide baselines.
#[async_trait]
pub trait BaselineStore: Send + Sync {
    async fn get(&self, tenant_id: &str, stream_key: &str) -> Result<BaselineMap, BaselineError>;

    async fn upsert(
        &self,
        tenant_id: &str,
        stream_key: &str,
        baselines: &BaselineMap,
    ) -> Result<(), BaselineError>;

    /// Removes every baseline of `tenant_id` last updated before `cutoff`.
    async fn cleanup_stale(
        &self,
        tenant_id: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, BaselineError>;

    /// Removes every baseline, of any tenant, last updated before `cutoff`.
    async fn cleanup_stale_all(&self, cutoff: DateTime<Utc>) -> Result<u64, BaselineError>;
}
