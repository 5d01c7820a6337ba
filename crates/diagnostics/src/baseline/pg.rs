use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::model::Baseline;
use super::store::{BaselineError, BaselineMap, BaselineStore};

pub struct PgBaselineStore {
    pool: PgPool,
}

impl PgBaselineStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BaselineRow {
    metric: String,
    avg: f64,
    m2: f64,
    sample_count: i64,
    updated_at: DateTime<Utc>,
}

#[async_trait]
impl BaselineStore for PgBaselineStore {
    async fn get(&self, tenant_id: &str, stream_key: &str) -> Result<BaselineMap, BaselineError> {
        let rows = sqlx::query_as::<_, BaselineRow>(
            "SELECT metric, avg, m2, sample_count, updated_at \
             FROM heartbeat_baselines WHERE tenant_id = $1 AND stream_key = $2",
        )
        .bind(tenant_id)
        .bind(stream_key)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| {
                (
                    r.metric,
                    Baseline {
                        avg: r.avg,
                        m2: r.m2,
                        sample_count: r.sample_count.max(0) as u64,
                        updated_at: r.updated_at,
                    },
                )
            })
            .collect())
    }

    async fn upsert(
        &self,
        tenant_id: &str,
        stream_key: &str,
        baselines: &BaselineMap,
    ) -> Result<(), BaselineError> {
        let mut tx = self.pool.begin().await?;
        for (metric, b) in baselines {
            sqlx::query(
                r#"INSERT INTO heartbeat_baselines
                   (tenant_id, stream_key, metric, avg, m2, sample_count, updated_at)
                   VALUES ($1, $2, $3, $4, $5, $6, $7)
                   ON CONFLICT (tenant_id, stream_key, metric) DO UPDATE SET
                       avg = EXCLUDED.avg,
                       m2 = EXCLUDED.m2,
                       sample_count = EXCLUDED.sample_count,
                       updated_at = EXCLUDED.updated_at"#,
            )
            .bind(tenant_id)
            .bind(stream_key)
            .bind(metric)
            .bind(b.avg)
            .bind(b.m2)
            .bind(b.sample_count as i64)
            .bind(b.updated_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn cleanup_stale(
        &self,
        tenant_id: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, BaselineError> {
        let result =
            sqlx::query("DELETE FROM heartbeat_baselines WHERE tenant_id = $1 AND updated_at < $2")
                .bind(tenant_id)
                .bind(cutoff)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }

    async fn cleanup_stale_all(&self, cutoff: DateTime<Utc>) -> Result<u64, BaselineError> {
        let result = sqlx::query("DELETE FROM heartbeat_baselines WHERE updated_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
