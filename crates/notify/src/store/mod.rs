mod memory;
mod pg;
mod record;

pub use memory::InMemoryReportStore;
pub use pg::PgReportStore;
pub use record::ReportRecord;

use async_trait::async_trait;

pub const DEFAULT_LIST_LIMIT: i64 = 50;
pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 100;

#[derive(Debug, Clone, PartialEq)]
pub enum ReportStoreError {
    TenantRequired,
    ReportIdRequired,
    Unavailable,
    NotFound,
    Sql(String),
}

impl std::fmt::Display for ReportStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TenantRequired => write!(f, "tenant id is required"),
            Self::ReportIdRequired => write!(f, "report id is required"),
            Self::Unavailable => write!(f, "report store unavailable"),
            Self::NotFound => write!(f, "report not found"),
            Self::Sql(e) => write!(f, "sql: {e}"),
        }
    }
}

impl std::error::Error for ReportStoreError {}

impl From<sqlx::Error> for ReportStoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::PoolClosed => Self::Unavailable,
            other => Self::Sql(other.to_string()),
        }
    }
}

/// Tenant-scoped persistence of investigation reports.
///
/// Every operation rejects an empty tenant id.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Stores `record`, assigning an id when it has none.
    async fn save(&self, record: ReportRecord) -> Result<ReportRecord, ReportStoreError>;

    async fn list_by_tenant(
        &self,
        tenant_id: &str,
        limit: i64,
    ) -> Result<Vec<ReportRecord>, ReportStoreError>;

    /// Returns one page (newest first) and the tenant's total report count.
    async fn list_by_tenant_paginated(
        &self,
        tenant_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<ReportRecord>, i64), ReportStoreError>;

    async fn get_by_id(
        &self,
        tenant_id: &str,
        report_id: &str,
    ) -> Result<ReportRecord, ReportStoreError>;

    /// Marks the given reports read, or every unread one when `report_ids` is empty.
    async fn mark_read(
        &self,
        tenant_id: &str,
        report_ids: &[String],
    ) -> Result<u64, ReportStoreError>;

    async fn unread_count(&self, tenant_id: &str) -> Result<i64, ReportStoreError>;
}

pub(crate) fn require_tenant(tenant_id: &str) -> Result<(), ReportStoreError> {
    if tenant_id.is_empty() {
        return Err(ReportStoreError::TenantRequired);
    }
    Ok(())
}

pub(crate) fn list_limit(limit: i64) -> i64 {
    if limit <= 0 {
        DEFAULT_LIST_LIMIT
    } else {
        limit
    }
}

pub(crate) fn page_bounds(limit: i64, offset: i64) -> (i64, i64) {
    let limit = if limit <= 0 {
        DEFAULT_PAGE_LIMIT
    } else {
        limit.min(MAX_PAGE_LIMIT)
    };
    (limit, offset.max(0))
}
