use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use crate::channel::{ChannelKind, Notifier, NotifyError};
use crate::notification::Notification;

const SESSION_BUFFER: usize = 32;

/// Payload pushed to a connected operator.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionMessage {
    pub tenant_id: String,
    pub report_id: String,
    pub trigger: String,
    pub summary: String,
    pub report_url: String,
    pub generated_at: DateTime<Utc>,
}

impl SessionMessage {
    fn from_notification(n: &Notification) -> Self {
        Self {
            tenant_id: n.tenant_id().to_string(),
            report_id: n.report_id().to_string(),
            trigger: n.record.trigger.clone(),
            summary: n.record.summary.clone(),
            report_url: n.report_url.clone(),
            generated_at: n.generated_at(),
        }
    }
}

#[derive(Default)]
struct TenantSessions {
    next_id: AtomicU64,
    senders: Mutex<HashMap<u64, mpsc::Sender<SessionMessage>>>,
}

impl TenantSessions {
    fn attach(&self) -> (u64, mpsc::Receiver<SessionMessage>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(SESSION_BUFFER);
        if let Ok(mut senders) = self.senders.lock() {
            senders.insert(id, tx);
        }
        (id, rx)
    }

    fn detach(&self, id: u64) {
        if let Ok(mut senders) = self.senders.lock() {
            senders.remove(&id);
        }
    }

    /// Sends to every open session and prunes closed ones. Returns deliveries.
    fn broadcast(&self, msg: &SessionMessage) -> usize {
        let Ok(mut senders) = self.senders.lock() else {
            return 0;
        };
        let mut delivered = 0;
        senders.retain(|id, tx| match tx.try_send(msg.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(session = id, tenant_id = %msg.tenant_id, "operator session lagging, message dropped");
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });
        delivered
    }

    fn len(&self) -> usize {
        self.senders.lock().map(|s| s.len()).unwrap_or(0)
    }
}

/// Live operator sessions grouped by tenant.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    tenants: Arc<RwLock<HashMap<String, Arc<TenantSessions>>>>,
}

/// Handle returned by [`SessionRegistry::subscribe`]; detaches on drop and
/// frees the tenant slot once its last session is gone.
pub struct SessionSubscription {
    registry: SessionRegistry,
    tenant_id: String,
    tenant: Arc<TenantSessions>,
    id: u64,
    pub receiver: mpsc::Receiver<SessionMessage>,
}

impl Drop for SessionSubscription {
    fn drop(&mut self) {
        self.tenant.detach(self.id);
        if self.tenant.len() == 0 {
            self.registry.prune(&self.tenant_id, &self.tenant);
        }
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn tenant(&self, tenant_id: &str) -> Option<Arc<TenantSessions>> {
        self.tenants.read().ok()?.get(tenant_id).cloned()
    }

    fn subscription(&self, tenant_id: &str, tenant: Arc<TenantSessions>) -> SessionSubscription {
        let (id, receiver) = tenant.attach();
        SessionSubscription {
            registry: self.clone(),
            tenant_id: tenant_id.to_string(),
            tenant,
            id,
            receiver,
        }
    }

    /// Attaches under the registry lock so a concurrent prune cannot drop the slot.
    pub fn subscribe(&self, tenant_id: &str) -> Option<SessionSubscription> {
        {
            let tenants = self.tenants.read().ok()?;
            if let Some(existing) = tenants.get(tenant_id) {
                return Some(self.subscription(tenant_id, Arc::clone(existing)));
            }
        }
        let mut tenants = self.tenants.write().ok()?;
        // re-check: another writer may have won
        let entry = tenants
            .entry(tenant_id.to_string())
            .or_insert_with(|| Arc::new(TenantSessions::default()));
        Some(self.subscription(tenant_id, Arc::clone(entry)))
    }

    /// Removes `slot` if it is still the tenant's entry and has no sessions.
    fn prune(&self, tenant_id: &str, slot: &Arc<TenantSessions>) {
        let Ok(mut tenants) = self.tenants.write() else {
            return;
        };
        let empty = tenants
            .get(tenant_id)
            .is_some_and(|current| Arc::ptr_eq(current, slot) && current.len() == 0);
        if empty {
            tenants.remove(tenant_id);
        }
    }

    pub fn tenant_count(&self) -> usize {
        self.tenants.read().map(|t| t.len()).unwrap_or(0)
    }

    pub fn session_count(&self, tenant_id: &str) -> usize {
        self.tenant(tenant_id).map(|t| t.len()).unwrap_or(0)
    }

    pub fn broadcast(&self, msg: &SessionMessage) -> usize {
        match self.tenant(&msg.tenant_id) {
            Some(t) => t.broadcast(msg),
            None => 0,
        }
    }
}

pub struct OperatorSessionNotifier {
    registry: SessionRegistry,
}

impl OperatorSessionNotifier {
    pub fn new(registry: SessionRegistry) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl Notifier for OperatorSessionNotifier {
    fn name(&self) -> &str {
        "operator_session"
    }

    fn kind(&self) -> ChannelKind {
        ChannelKind::OperatorSession
    }

    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        if notification.tenant_id().is_empty() {
            return Err(NotifyError("tenant id is required".into()));
        }
        let delivered = self
            .registry
            .broadcast(&SessionMessage::from_notification(notification));
        tracing::debug!(
            tenant_id = %notification.tenant_id(),
            sessions = delivered,
            "pushed report to operator sessions"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ReportRecord;

    fn notification(tenant: &str, id: &str) -> Notification {
        Notification::new(ReportRecord {
            id: id.into(),
            tenant_id: tenant.into(),
            trigger: "baseline".into(),
            summary: format!("summary {id}"),
            metrics_reviewed: vec![],
            root_cause: String::new(),
            recommendations: vec![],
            created_at: Utc::now(),
            read_at: None,
        })
    }

    #[tokio::test]
    async fn delivers_only_to_own_tenant() {
        let registry = SessionRegistry::new();
        let mut a1 = registry.subscribe("tenant-a").unwrap();
        let mut a2 = registry.subscribe("tenant-a").unwrap();
        let mut b = registry.subscribe("tenant-b").unwrap();

        let notifier = OperatorSessionNotifier::new(registry.clone());
        notifier.notify(&notification("tenant-a", "r1")).await.unwrap();

        assert_eq!(a1.receiver.recv().await.unwrap().report_id, "r1");
        assert_eq!(a2.receiver.recv().await.unwrap().report_id, "r1");
        assert!(b.receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn no_sessions_is_ok() {
        let notifier = OperatorSessionNotifier::new(SessionRegistry::new());
        notifier.notify(&notification("nobody", "r1")).await.unwrap();
    }

    #[test]
    fn dropping_subscription_detaches() {
        let registry = SessionRegistry::new();
        let sub = registry.subscribe("t").unwrap();
        assert_eq!(registry.session_count("t"), 1);
        drop(sub);
        assert_eq!(registry.session_count("t"), 0);
    }

    #[test]
    fn last_drop_frees_the_tenant_slot() {
        let registry = SessionRegistry::new();
        let s1 = registry.subscribe("t").unwrap();
        let s2 = registry.subscribe("t").unwrap();
        let _other = registry.subscribe("u").unwrap();
        assert_eq!(registry.tenant_count(), 2);

        drop(s1);
        assert_eq!(registry.tenant_count(), 2);
        drop(s2);
        assert_eq!(registry.session_count("t"), 0);
        assert_eq!(registry.tenant_count(), 1);

        let mut again = registry.subscribe("t").unwrap();
        assert_eq!(registry.session_count("t"), 1);
        let msg = SessionMessage::from_notification(&notification("t", "r9"));
        assert_eq!(registry.broadcast(&msg), 1);
        assert_eq!(again.receiver.try_recv().unwrap().report_id, "r9");
    }

    #[test]
    fn subscribe_reuses_tenant_entry() {
        let registry = SessionRegistry::new();
        let _s1 = registry.subscribe("t").unwrap();
        let _s2 = registry.subscribe("t").unwrap();
        assert_eq!(registry.session_count("t"), 2);
        assert_eq!(registry.tenants.read().unwrap().len(), 1);
    }
}
