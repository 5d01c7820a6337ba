use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use heartbeat_common::snapshot::MetricMap;

use super::model::Baseline;
use super::store::{BaselineError, BaselineMap, BaselineStore};
use crate::deviation::{Deviation, Direction};

pub const DEFAULT_SIGMA_LIMIT: f64 = 2.0;
pub const DEFAULT_MIN_SAMPLES: u64 = 5;

/// Scores observations against stored baselines and folds them in afterwards.
#[derive(Clone)]
pub struct BaselineEvaluator {
    store: Arc<dyn BaselineStore>,
    sigma_limit: f64,
    min_samples: u64,
}

impl BaselineEvaluator {
    pub fn new(store: Arc<dyn BaselineStore>, sigma_limit: f64, min_samples: u64) -> Self {
        let sigma_limit = if sigma_limit > 0.0 {
            sigma_limit
        } else {
            DEFAULT_SIGMA_LIMIT
        };
        let min_samples = if min_samples > 0 {
            min_samples
        } else {
            DEFAULT_MIN_SAMPLES
        };
        Self {
            store,
            sigma_limit,
            min_samples,
        }
    }

    pub fn sigma_limit(&self) -> f64 {
        self.sigma_limit
    }

    pub fn store(&self) -> &Arc<dyn BaselineStore> {
        &self.store
    }

    /// Compares `metrics` against the current baselines without mutating them.
    ///
    /// Metrics with no baseline, too few samples or zero spread yield nothing.
    pub async fn deviations(
        &self,
        tenant_id: &str,
        stream_key: &str,
        metrics: &MetricMap,
    ) -> Result<Vec<Deviation>, BaselineError> {
        let baselines = self.store.get(tenant_id, stream_key).await?;
        Ok(self.score(&baselines, metrics))
    }

    pub(crate) fn score(&self, baselines: &BaselineMap, metrics: &MetricMap) -> Vec<Deviation> {
        let mut out = Vec::new();
        for (metric, &current) in metrics {
            let Some(b) = baselines.get(metric) else {
                continue;
            };
            if b.sample_count < self.min_samples {
                continue;
            }
            let stddev = b.stddev();
            if stddev == 0.0 {
                continue;
            }
            let sigma = (current - b.avg).abs() / stddev;
            if sigma < self.sigma_limit {
                continue;
            }
            let direction = if current > b.avg {
                Direction::Above
            } else {
                Direction::Below
            };
            out.push(Deviation {
                metric: metric.clone(),
                current,
                baseline: b.avg,
                stddev,
                sigma,
                direction,
            });
        }
        out
    }

    /// Folds `metrics` into the stored baselines. Run after `deviations`.
    pub async fn update(
        &self,
        tenant_id: &str,
        stream_key: &str,
        metrics: &MetricMap,
    ) -> Result<(), BaselineError> {
        if metrics.is_empty() {
            return Ok(());
        }
        let now = Utc::now();
        let mut baselines = self.store.get(tenant_id, stream_key).await?;
        for (metric, &value) in metrics {
            baselines
                .entry(metric.clone())
                .or_insert_with(|| Baseline::empty(now))
                .observe(value, now);
        }
        baselines.retain(|metric, _| metrics.contains_key(metric));
        self.store.upsert(tenant_id, stream_key, &baselines).await
    }

    /// Current means for every baseline under `stream_key`.
    pub async fn baseline_means(
        &self,
        tenant_id: &str,
        stream_key: &str,
    ) -> Result<MetricMap, BaselineError> {
        let baselines = self.store.get(tenant_id, stream_key).await?;
        Ok(baselines
            .into_iter()
            .filter(|(_, b)| b.sample_count > 0)
            .map(|(metric, b)| (metric, b.avg))
            .collect())
    }

    pub async fn cleanup(&self, tenant_id: &str, max_age: Duration) -> Result<u64, BaselineError> {
        let max_age = chrono::Duration::from_std(max_age)
            .map_err(|e| BaselineError::Store(e.to_string()))?;
        self.store.cleanup_stale(tenant_id, Utc::now() - max_age).await
    }

    /// Evicts baselines older than `max_age` for every tenant, reporting or not.
    pub async fn cleanup_all(&self, max_age: Duration) -> Result<u64, BaselineError> {
        let max_age = chrono::Duration::from_std(max_age)
            .map_err(|e| BaselineError::Store(e.to_string()))?;
        self.store.cleanup_stale_all(Utc::now() - max_age).await
    }
}
