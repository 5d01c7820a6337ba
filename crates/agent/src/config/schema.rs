use std::collections::HashMap;
use std::time::Duration;

use heartbeat_common::nats_config;
use heartbeat_diagnostics::{ThresholdConfig, TriagePolicy};
use heartbeat_notify::{NotificationPreferences, SmtpConfig};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HeartbeatConfig {
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,
    #[serde(default = "default_required_tier_level")]
    pub required_tier_level: i32,
    #[serde(default = "default_flag_cooldown_seconds")]
    pub flag_cooldown_seconds: u64,
    #[serde(default = "default_retention_days")]
    pub baseline_retention_days: u64,
    #[serde(default = "default_http_timeout_seconds")]
    pub http_timeout_seconds: u64,
    #[serde(default = "default_api_addr")]
    pub api_addr: String,
    #[serde(default)]
    pub webapp_url: String,
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default)]
    pub nats_url: Option<String>,
    pub endpoints: EndpointsConfig,
    pub llm: LlmConfig,
    #[serde(default)]
    pub baseline: BaselineSettings,
    #[serde(default)]
    pub triage: TriagePolicy,
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub infra: InfraConfig,
    #[serde(default)]
    pub lookout: LookoutConfig,
}

impl HeartbeatConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }

    pub fn flag_cooldown(&self) -> Duration {
        Duration::from_secs(self.flag_cooldown_seconds)
    }

    pub fn baseline_retention(&self) -> Duration {
        Duration::from_secs(self.baseline_retention_days * 24 * 60 * 60)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct EndpointsConfig {
    pub metrics_url: String,
    pub billing_url: String,
    pub registry_url: String,
    #[serde(default)]
    pub service_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LlmConfig {
    pub base_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct BaselineSettings {
    #[serde(default = "default_sigma_limit")]
    pub sigma_limit: f64,
    #[serde(default = "default_min_samples")]
    pub min_samples: u64,
}

impl Default for BaselineSettings {
    fn default() -> Self {
        Self {
            sigma_limit: default_sigma_limit(),
            min_samples: default_min_samples(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct NotificationsConfig {
    #[serde(default)]
    pub defaults: NotificationPreferences,
    #[serde(default)]
    pub tenants: HashMap<String, NotificationPreferences>,
}

impl NotificationsConfig {
    pub fn for_tenant(&self, tenant_id: &str) -> NotificationPreferences {
        self.tenants.get(tenant_id).copied().unwrap_or(self.defaults)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct InfraConfig {
    #[serde(default = "yes")]
    pub enabled: bool,
    #[serde(default = "default_infra_cooldown_seconds")]
    pub cooldown_seconds: u64,
}

impl Default for InfraConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cooldown_seconds: default_infra_cooldown_seconds(),
        }
    }
}

/// Durable JetStream consumer for lookout incidents.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LookoutConfig {
    #[serde(default = "yes")]
    pub enabled: bool,
    #[serde(default = "default_lookout_stream")]
    pub stream: String,
    #[serde(default = "default_lookout_subject")]
    pub subject: String,
    #[serde(default = "default_lookout_durable")]
    pub durable: String,
    #[serde(default = "default_lookout_batch_size")]
    pub batch_size: usize,
}

impl Default for LookoutConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            stream: default_lookout_stream(),
            subject: default_lookout_subject(),
            durable: default_lookout_durable(),
            batch_size: default_lookout_batch_size(),
        }
    }
}

fn default_interval_seconds() -> u64 {
    30 * 60
}

fn default_window_seconds() -> u64 {
    15 * 60
}

fn default_required_tier_level() -> i32 {
    3
}

fn default_flag_cooldown_seconds() -> u64 {
    2 * 60 * 60
}

fn default_retention_days() -> u64 {
    7
}

fn default_http_timeout_seconds() -> u64 {
    30
}

fn default_api_addr() -> String {
    "0.0.0.0:9100".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_sigma_limit() -> f64 {
    heartbeat_diagnostics::baseline::DEFAULT_SIGMA_LIMIT
}

fn default_min_samples() -> u64 {
    heartbeat_diagnostics::baseline::DEFAULT_MIN_SAMPLES
}

fn default_infra_cooldown_seconds() -> u64 {
    4 * 60 * 60
}

fn default_lookout_stream() -> String {
    nats_config::LOOKOUT_STREAM_NAME.to_string()
}

fn default_lookout_subject() -> String {
    nats_config::LOOKOUT_SUBJECT.to_string()
}

fn default_lookout_durable() -> String {
    nats_config::LOOKOUT_CONSUMER_NAME.to_string()
}

fn default_lookout_batch_size() -> usize {
    10
}

fn yes() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use heartbeat_diagnostics::Severity;

    const MINIMAL: &str = r#"
endpoints:
  metrics_url: http://metrics.local
  billing_url: http://billing.local
  registry_url: http://registry.local
llm:
  base_url: http://llm.local/v1
"#;

    #[test]
    fn defaults_applied() {
        let cfg: HeartbeatConfig = serde_yaml::from_str(MINIMAL).unwrap();
        assert_eq!(cfg.interval(), Duration::from_secs(1800));
        assert_eq!(cfg.window(), Duration::from_secs(900));
        assert_eq!(cfg.required_tier_level, 3);
        assert_eq!(cfg.flag_cooldown(), Duration::from_secs(7200));
        assert_eq!(cfg.baseline_retention(), Duration::from_secs(7 * 86_400));
        assert_eq!(cfg.baseline.sigma_limit, 2.0);
        assert_eq!(cfg.baseline.min_samples, 5);
        assert_eq!(cfg.triage.investigate_sigma, 4.0);
        assert_eq!(cfg.triage.correlation_confidence, 0.5);
        assert_eq!(cfg.thresholds.min_fps.limit, 24.0);
        assert_eq!(cfg.smtp.port, 587);
        assert!(cfg.infra.enabled);
        assert!(cfg.lookout.enabled);
        assert_eq!(cfg.lookout.subject, "lookout.incidents");
        assert_eq!(cfg.lookout.durable, "heartbeat-lookout");
        assert_eq!(cfg.lookout.batch_size, 10);
        assert_eq!(cfg.llm.model, "gpt-4o-mini");
    }

    #[test]
    fn deserialize_full() {
        let yaml = r#"
interval_seconds: 600
window_seconds: 300
required_tier_level: 2
webapp_url: https://app.example.com
database_url: postgres://heartbeat@db/heartbeat
nats_url: nats://127.0.0.1:4222
endpoints:
  metrics_url: http://metrics.local
  billing_url: http://billing.local
  registry_url: http://registry.local
  service_token: secret
llm:
  base_url: http://llm.local/v1
  model: local-model
triage:
  investigate_sigma: 5.0
thresholds:
  min_fps:
    limit: 20
    severity: warning
smtp:
  host: smtp.example.com
  from: heartbeat@example.com
notifications:
  defaults:
    email: false
  tenants:
    tenant-a:
      email: true
      live_update: false
infra:
  enabled: false
lookout:
  subject: lookout.incidents.eu
  batch_size: 25
"#;
        let cfg: HeartbeatConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.interval_seconds, 600);
        assert_eq!(cfg.required_tier_level, 2);
        assert_eq!(cfg.triage.investigate_sigma, 5.0);
        assert_eq!(cfg.triage.correlation_confidence, 0.5);
        assert_eq!(cfg.thresholds.min_fps.limit, 20.0);
        assert_eq!(cfg.thresholds.min_fps.severity, Severity::Warning);
        assert_eq!(cfg.thresholds.min_bitrate.limit, 800_000.0);
        assert!(cfg.smtp.is_configured());
        assert!(!cfg.infra.enabled);
        assert_eq!(cfg.lookout.subject, "lookout.incidents.eu");
        assert_eq!(cfg.lookout.batch_size, 25);
        assert_eq!(cfg.lookout.stream, "LOOKOUT_INCIDENTS");

        let a = cfg.notifications.for_tenant("tenant-a");
        assert_eq!(a.email, Some(true));
        assert_eq!(a.live_update, Some(false));
        let other = cfg.notifications.for_tenant("tenant-b");
        assert_eq!(other.email, Some(false));
    }
}
