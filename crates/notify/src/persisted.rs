use std::sync::Arc;

use async_trait::async_trait;

use crate::channel::{ChannelKind, Notifier, NotifyError};
use crate::notification::Notification;
use crate::store::ReportStore;

pub struct PersistedStoreNotifier {
    store: Arc<dyn ReportStore>,
}

impl PersistedStoreNotifier {
    pub fn new(store: Arc<dyn ReportStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Notifier for PersistedStoreNotifier {
    fn name(&self) -> &str {
        "persisted_store"
    }

    fn kind(&self) -> ChannelKind {
        ChannelKind::PersistedStore
    }

    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.store
            .save(notification.record.clone())
            .await
            .map_err(|e| NotifyError(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryReportStore, ReportRecord};
    use chrono::Utc;

    fn record(tenant: &str) -> ReportRecord {
        ReportRecord {
            id: "r-1".into(),
            tenant_id: tenant.into(),
            trigger: "threshold".into(),
            summary: "fps collapsed".into(),
            metrics_reviewed: vec![],
            root_cause: "encoder".into(),
            recommendations: vec![],
            created_at: Utc::now(),
            read_at: None,
        }
    }

    #[tokio::test]
    async fn saves_record() {
        let store = InMemoryReportStore::new();
        let notifier = PersistedStoreNotifier::new(Arc::new(store.clone()));
        notifier.notify(&Notification::new(record("t1"))).await.unwrap();
        assert_eq!(store.get_by_id("t1", "r-1").await.unwrap().summary, "fps collapsed");
    }

    #[tokio::test]
    async fn empty_tenant_surfaces_store_error() {
        let notifier = PersistedStoreNotifier::new(Arc::new(InMemoryReportStore::new()));
        let err = notifier.notify(&Notification::new(record(""))).await.unwrap_err();
        assert_eq!(err.0, "tenant id is required");
    }
}
