use async_trait::async_trait;
use chrono::{DateTime, Utc};
use heartbeat_common::report::Recommendation;
use sqlx::types::Json;
use sqlx::PgPool;

use super::record::ReportRecord;
use super::{list_limit, page_bounds, require_tenant, ReportStore, ReportStoreError};

const SELECT_COLUMNS: &str = "SELECT id, tenant_id, trigger, summary, metrics_reviewed, \
     root_cause, recommendations, created_at, read_at FROM heartbeat_reports";

pub struct PgReportStore {
    pool: PgPool,
}

impl PgReportStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn check(&self, tenant_id: &str) -> Result<(), ReportStoreError> {
        if self.pool.is_closed() {
            return Err(ReportStoreError::Unavailable);
        }
        require_tenant(tenant_id)
    }
}

#[derive(sqlx::FromRow)]
struct ReportRow {
    id: String,
    tenant_id: String,
    trigger: String,
    summary: String,
    metrics_reviewed: Json<Vec<String>>,
    root_cause: String,
    recommendations: Json<Vec<Recommendation>>,
    created_at: DateTime<Utc>,
    read_at: Option<DateTime<Utc>>,
}

impl From<ReportRow> for ReportRecord {
    fn from(r: ReportRow) -> Self {
        Self {
            id: r.id,
            tenant_id: r.tenant_id,
            trigger: r.trigger,
            summary: r.summary,
            metrics_reviewed: r.metrics_reviewed.0,
            root_cause: r.root_cause,
            recommendations: r.recommendations.0,
            created_at: r.created_at,
            read_at: r.read_at,
        }
    }
}

#[async_trait]
impl ReportStore for PgReportStore {
    async fn save(&self, mut record: ReportRecord) -> Result<ReportRecord, ReportStoreError> {
        self.check(&record.tenant_id)?;
        if record.id.is_empty() {
            record.id = uuid::Uuid::new_v4().to_string();
        }

        let created_at: DateTime<Utc> = sqlx::query_scalar(
            r#"INSERT INTO heartbeat_reports
               (id, tenant_id, trigger, summary, metrics_reviewed, root_cause,
                recommendations, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING created_at"#,
        )
        .bind(&record.id)
        .bind(&record.tenant_id)
        .bind(&record.trigger)
        .bind(&record.summary)
        .bind(Json(&record.metrics_reviewed))
        .bind(&record.root_cause)
        .bind(Json(&record.recommendations))
        .bind(record.created_at)
        .fetch_one(&self.pool)
        .await?;

        record.created_at = created_at;
        Ok(record)
    }

    async fn list_by_tenant(
        &self,
        tenant_id: &str,
        limit: i64,
    ) -> Result<Vec<ReportRecord>, ReportStoreError> {
        self.check(tenant_id)?;
        let rows = sqlx::query_as::<_, ReportRow>(&format!(
            "{SELECT_COLUMNS} WHERE tenant_id = $1 ORDER BY created_at DESC LIMIT $2"
        ))
        .bind(tenant_id)
        .bind(list_limit(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(ReportRecord::from).collect())
    }

    async fn list_by_tenant_paginated(
        &self,
        tenant_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<ReportRecord>, i64), ReportStoreError> {
        self.check(tenant_id)?;
        let (limit, offset) = page_bounds(limit, offset);

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM heartbeat_reports WHERE tenant_id = $1")
                .bind(tenant_id)
                .fetch_one(&self.pool)
                .await?;

        let rows = sqlx::query_as::<_, ReportRow>(&format!(
            "{SELECT_COLUMNS} WHERE tenant_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(tenant_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows.into_iter().map(ReportRecord::from).collect(), total))
    }

    async fn get_by_id(
        &self,
        tenant_id: &str,
        report_id: &str,
    ) -> Result<ReportRecord, ReportStoreError> {
        self.check(tenant_id)?;
        if report_id.is_empty() {
            return Err(ReportStoreError::ReportIdRequired);
        }
        let row = sqlx::query_as::<_, ReportRow>(&format!(
            "{SELECT_COLUMNS} WHERE id = $1 AND tenant_id = $2"
        ))
        .bind(report_id)
        .bind(tenant_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn mark_read(
        &self,
        tenant_id: &str,
        report_ids: &[String],
    ) -> Result<u64, ReportStoreError> {
        self.check(tenant_id)?;
        let result = if report_ids.is_empty() {
            sqlx::query(
                "UPDATE heartbeat_reports SET read_at = NOW() \
                 WHERE tenant_id = $1 AND read_at IS NULL",
            )
            .bind(tenant_id)
            .execute(&self.pool)
            .await?
        } else {
            sqlx::query(
                "UPDATE heartbeat_reports SET read_at = NOW() \
                 WHERE tenant_id = $1 AND id = ANY($2) AND read_at IS NULL",
            )
            .bind(tenant_id)
            .bind(report_ids)
            .execute(&self.pool)
            .await?
        };
        Ok(result.rows_affected())
    }

    async fn unread_count(&self, tenant_id: &str) -> Result<i64, ReportStoreError> {
        self.check(tenant_id)?;
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM heartbeat_reports WHERE tenant_id = $1 AND read_at IS NULL",
        )
        .bind(tenant_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
