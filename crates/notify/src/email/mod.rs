mod config;
mod notifier;
mod render;
mod transport;

pub use config::SmtpConfig;
pub use notifier::EmailNotifier;
pub use render::{escape_html, render_report, report_subject};
pub use transport::{MailTransport, SmtpTransport};
