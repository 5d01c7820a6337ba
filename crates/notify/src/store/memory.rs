use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use super::record::ReportRecord;
use super::{list_limit, page_bounds, require_tenant, ReportStore, ReportStoreError};

#[derive(Clone, Default)]
pub struct InMemoryReportStore {
    reports: Arc<DashMap<String, ReportRecord>>,
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.reports.len()
    }

    fn tenant_reports(&self, tenant_id: &str) -> Vec<ReportRecord> {
        let mut out: Vec<ReportRecord> = self
            .reports
            .iter()
            .filter(|r| r.value().tenant_id == tenant_id)
            .map(|r| r.value().clone())
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        out
    }
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn save(&self, mut record: ReportRecord) -> Result<ReportRecord, ReportStoreError> {
        require_tenant(&record.tenant_id)?;
        if record.id.is_empty() {
            record.id = uuid::Uuid::new_v4().to_string();
        }
        self.reports.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn list_by_tenant(
        &self,
        tenant_id: &str,
        limit: i64,
    ) -> Result<Vec<ReportRecord>, ReportStoreError> {
        require_tenant(tenant_id)?;
        let mut out = self.tenant_reports(tenant_id);
        out.truncate(list_limit(limit) as usize);
        Ok(out)
    }

    async fn list_by_tenant_paginated(
        &self,
        tenant_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<ReportRecord>, i64), ReportStoreError> {
        require_tenant(tenant_id)?;
        let (limit, offset) = page_bounds(limit, offset);
        let all = self.tenant_reports(tenant_id);
        let total = all.len() as i64;
        let page = all
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn get_by_id(
        &self,
        tenant_id: &str,
        report_id: &str,
    ) -> Result<ReportRecord, ReportStoreError> {
        require_tenant(tenant_id)?;
        if report_id.is_empty() {
            return Err(ReportStoreError::ReportIdRequired);
        }
        self.reports
            .get(report_id)
            .filter(|r| r.tenant_id == tenant_id)
            .map(|r| r.clone())
            .ok_or(ReportStoreError::NotFound)
    }

    async fn mark_read(
        &self,
        tenant_id: &str,
        report_ids: &[String],
    ) -> Result<u64, ReportStoreError> {
        require_tenant(tenant_id)?;
        let now = Utc::now();
        let mut marked = 0;
        for mut entry in self.reports.iter_mut() {
            let r = entry.value_mut();
            if r.tenant_id != tenant_id || r.read_at.is_some() {
                continue;
            }
            if !report_ids.is_empty() && !report_ids.contains(&r.id) {
                continue;
            }
            r.read_at = Some(now);
            marked += 1;
        }
        Ok(marked)
    }

    async fn unread_count(&self, tenant_id: &str) -> Result<i64, ReportStoreError> {
        require_tenant(tenant_id)?;
        Ok(self
            .reports
            .iter()
            .filter(|r| r.tenant_id == tenant_id && r.read_at.is_none())
            .count() as i64)
    }
}
