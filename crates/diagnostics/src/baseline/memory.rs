use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use super::model::Baseline;
use super::store::{BaselineError, BaselineMap, BaselineStore};

#[derive(Clone, Hash, Eq, PartialEq, Debug)]
struct BaselineKey {
    tenant_id: String,
    stream_key: String,
    metric: String,
}

#[derive(Clone, Default)]
pub struct InMemoryBaselineStore {
    baselines: Arc<DashMap<BaselineKey, Baseline>>,
}

impl InMemoryBaselineStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.baselines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.baselines.is_empty()
    }
}

#[async_trait]
impl BaselineStore for InMemoryBaselineStore {
    async fn get(&self, tenant_id: &str, stream_key: &str) -> Result<BaselineMap, BaselineError> {
        Ok(self
            .baselines
            .iter()
            .filter(|e| e.key().tenant_id == tenant_id && e.key().stream_key == stream_key)
            .map(|e| (e.key().metric.clone(), e.value().clone()))
            .collect())
    }

    async fn upsert(
        &self,
        tenant_id: &str,
        stream_key: &str,
        baselines: &BaselineMap,
    ) -> Result<(), BaselineError> {
        for (metric, baseline) in baselines {
            let key = BaselineKey {
                tenant_id: tenant_id.to_string(),
                stream_key: stream_key.to_string(),
                metric: metric.clone(),
            };
            self.baselines.insert(key, baseline.clone());
        }
        Ok(())
    }

    async fn cleanup_stale(
        &self,
        tenant_id: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, BaselineError> {
        let before = self.baselines.len();
        self.baselines
            .retain(|k, v| k.tenant_id != tenant_id || v.updated_at >= cutoff);
        Ok(before.saturating_sub(self.baselines.len()) as u64)
    }

    async fn cleanup_stale_all(&self, cutoff: DateTime<Utc>) -> Result<u64, BaselineError> {
        let before = self.baselines.len();
        self.baselines.retain(|_, v| v.updated_at >= cutoff);
        Ok(before.saturating_sub(self.baselines.len()) as u64)
    }
}
