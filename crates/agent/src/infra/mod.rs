mod alert;
mod monitor;

pub use alert::{render_alert, InfraAlert, InfraAlertType};
pub use monitor::{sustained, InfraMonitor, DEFAULT_INFRA_COOLDOWN};
