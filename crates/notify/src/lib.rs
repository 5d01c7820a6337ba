pub mod channel;
pub mod dispatcher;
pub mod email;
pub mod live;
pub mod notification;
pub mod persisted;
pub mod preferences;
pub mod session;
pub mod store;

pub use channel::{ChannelKind, Notifier, NotifyError};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use email::{EmailNotifier, MailTransport, SmtpConfig, SmtpTransport};
pub use live::{
    InMemoryLiveUpdatePublisher, LiveUpdateEvent, LiveUpdateNotifier, LiveUpdatePublisher,
    NatsLiveUpdatePublisher, PublishError,
};
pub use notification::Notification;
pub use persisted::PersistedStoreNotifier;
pub use preferences::NotificationPreferences;
pub use session::{OperatorSessionNotifier, SessionMessage, SessionRegistry, SessionSubscription};
pub use store::{InMemoryReportStore, PgReportStore, ReportRecord, ReportStore, ReportStoreError};
