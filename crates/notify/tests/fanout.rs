use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use heartbeat_notify::{
    Dispatcher, EmailNotifier, InMemoryLiveUpdatePublisher, InMemoryReportStore,
    LiveUpdateNotifier, MailTransport, Notification, NotifyError, OperatorSessionNotifier,
    PersistedStoreNotifier, ReportRecord, ReportStore, SessionRegistry,
};

struct RejectingSmtp;

#[async_trait]
impl MailTransport for RejectingSmtp {
    async fn send_html(&self, _to: &str, _subject: &str, _html: String) -> Result<(), NotifyError> {
        Err(NotifyError("550 mailbox unavailable".into()))
    }
}

fn notification() -> Notification {
    let mut n = Notification::new(ReportRecord {
        id: "report-1".into(),
        tenant_id: "tenant-a".into(),
        trigger: "threshold".into(),
        summary: "Buffer health collapsed on two streams".into(),
        metrics_reviewed: vec!["avg_buffer_health".into()],
        root_cause: "origin saturation".into(),
        recommendations: vec![],
        created_at: Utc::now(),
        read_at: None,
    });
    n.recipient_email = "ops@tenant-a.example".into();
    n.tenant_name = "Tenant A".into();
    n
}

#[tokio::test]
async fn failing_email_does_not_block_other_channels() {
    let store = InMemoryReportStore::new();
    let live = InMemoryLiveUpdatePublisher::new();
    let sessions = SessionRegistry::new();
    let mut operator = sessions.subscribe("tenant-a").unwrap();
    let mut other_tenant = sessions.subscribe("tenant-b").unwrap();

    let dispatcher = Dispatcher::new()
        .with_channel(Arc::new(PersistedStoreNotifier::new(Arc::new(store.clone()))))
        .with_channel(Arc::new(OperatorSessionNotifier::new(sessions.clone())))
        .with_channel(Arc::new(LiveUpdateNotifier::new(Arc::new(live.clone()))))
        .with_channel(Arc::new(EmailNotifier::with_transport(Arc::new(RejectingSmtp))));

    let outcome = dispatcher.dispatch(&notification()).await;

    assert_eq!(
        outcome.delivered,
        vec!["persisted_store", "operator_session", "live_update"]
    );
    assert_eq!(outcome.failed, vec!["email"]);

    let saved = store.get_by_id("tenant-a", "report-1").await.unwrap();
    assert_eq!(saved.trigger, "threshold");
    assert_eq!(live.published_count(), 1);
    assert_eq!(operator.receiver.recv().await.unwrap().report_id, "report-1");
    assert!(other_tenant.receiver.try_recv().is_err());

    let err = outcome.into_result().unwrap_err();
    assert!(err.0.starts_with("email:"));
    assert!(err.0.contains("550 mailbox unavailable"));
    assert!(!err.0.contains("live_update"));
    assert!(!err.0.contains("persisted_store"));
}

#[tokio::test]
async fn report_without_recipient_still_counts_as_delivered() {
    let store = InMemoryReportStore::new();
    let dispatcher = Dispatcher::new()
        .with_channel(Arc::new(PersistedStoreNotifier::new(Arc::new(store.clone()))))
        .with_channel(Arc::new(EmailNotifier::with_transport(Arc::new(RejectingSmtp))));

    let mut n = notification();
    n.recipient_email.clear();
    let outcome = dispatcher.dispatch(&n).await;

    assert_eq!(outcome.delivered, vec!["persisted_store", "email"]);
    assert!(outcome.failed.is_empty());
    assert!(outcome.into_result().is_ok());
    assert_eq!(store.count(), 1);
}
