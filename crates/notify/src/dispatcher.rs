use std::sync::Arc;

use crate::channel::{Notifier, NotifyError};
use crate::notification::Notification;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct DispatchOutcome {
    pub delivered: Vec<String>,
    pub failed: Vec<String>,
    pub skipped: Vec<String>,
    pub first_error: Option<NotifyError>,
}

impl DispatchOutcome {
    pub fn into_result(self) -> Result<(), NotifyError> {
        match self.first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Fans a notification out to every channel; one failure never blocks the rest.
#[derive(Clone, Default)]
pub struct Dispatcher {
    channels: Vec<Arc<dyn Notifier>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel(mut self, channel: Arc<dyn Notifier>) -> Self {
        self.channels.push(channel);
        self
    }

    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    pub async fn dispatch(&self, notification: &Notification) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();

        for channel in &self.channels {
            let name = channel.name().to_string();
            let kind = channel.kind();
            if !notification.preferences.allows(kind) {
                tracing::debug!(tenant_id = %notification.tenant_id(), channel = %name, "channel disabled by preferences");
                outcome.skipped.push(name);
                continue;
            }

            match channel.notify(notification).await {
                Ok(()) => outcome.delivered.push(name),
                Err(e) => {
                    tracing::warn!(
                        tenant_id = %notification.tenant_id(),
                        report_id = %notification.report_id(),
                        channel = %name,
                        error = %e.0,
                        "notification channel failed"
                    );
                    if outcome.first_error.is_none() {
                        outcome.first_error = Some(NotifyError(format!("{name}: {}", e.0)));
                    }
                    outcome.failed.push(name);
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ChannelKind;
    use crate::preferences::NotificationPreferences;
    use crate::store::ReportRecord;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        name: &'static str,
        kind: ChannelKind,
        fail: bool,
        calls: AtomicUsize,
    }

    impl Counting {
        fn new(name: &'static str, kind: ChannelKind, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                name,
                kind,
                fail,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Notifier for Counting {
        fn name(&self) -> &str {
            self.name
        }

        fn kind(&self) -> ChannelKind {
            self.kind
        }

        async fn notify(&self, _n: &Notification) -> Result<(), NotifyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(NotifyError("boom".into()))
            } else {
                Ok(())
            }
        }
    }

    fn notification() -> Notification {
        Notification::new(ReportRecord {
            id: "r".into(),
            tenant_id: "t".into(),
            trigger: String::new(),
            summary: String::new(),
            metrics_reviewed: vec![],
            root_cause: String::new(),
            recommendations: vec![],
            created_at: Utc::now(),
            read_at: None,
        })
    }

    #[tokio::test]
    async fn first_error_kept_and_others_continue() {
        let a = Counting::new("a", ChannelKind::LiveUpdate, true);
        let b = Counting::new("b", ChannelKind::Email, true);
        let c = Counting::new("c", ChannelKind::OperatorSession, false);
        let d = Dispatcher::new()
            .with_channel(a.clone())
            .with_channel(b.clone())
            .with_channel(c.clone());

        let outcome = d.dispatch(&notification()).await;
        assert_eq!(outcome.delivered, vec!["c"]);
        assert_eq!(outcome.failed, vec!["a", "b"]);
        assert_eq!(outcome.first_error, Some(NotifyError("a: boom".into())));
        assert_eq!(c.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn preferences_skip_channels_but_not_store() {
        let store = Counting::new("store", ChannelKind::PersistedStore, false);
        let email = Counting::new("email", ChannelKind::Email, false);
        let d = Dispatcher::new()
            .with_channel(store.clone())
            .with_channel(email.clone());

        let mut n = notification();
        n.preferences = NotificationPreferences {
            email: Some(false),
            live_update: None,
            operator_session: None,
        };
        let outcome = d.dispatch(&n).await;
        assert_eq!(outcome.delivered, vec!["store"]);
        assert_eq!(outcome.skipped, vec!["email"]);
        assert_eq!(email.calls.load(Ordering::SeqCst), 0);
        assert!(outcome.into_result().is_ok());
    }

    #[tokio::test]
    async fn store_runs_with_every_switch_off() {
        let store = Counting::new("store", ChannelKind::PersistedStore, false);
        let live = Counting::new("live", ChannelKind::LiveUpdate, false);
        let d = Dispatcher::new()
            .with_channel(store.clone())
            .with_channel(live.clone());

        let mut n = notification();
        n.preferences = NotificationPreferences {
            email: Some(false),
            live_update: Some(false),
            operator_session: Some(false),
        };
        let outcome = d.dispatch(&n).await;
        assert_eq!(outcome.delivered, vec!["store"]);
        assert_eq!(outcome.skipped, vec!["live"]);
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }
}
