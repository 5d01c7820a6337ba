use std::path::Path;

use super::schema::HeartbeatConfig;

pub const ENV_SMTP_PASSWORD: &str = "HEARTBEAT_SMTP_PASSWORD";
pub const ENV_LLM_API_KEY: &str = "HEARTBEAT_LLM_API_KEY";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_yaml::Error),
    Validation(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Parse(e) => write!(f, "parse: {e}"),
            Self::Validation(msg) => write!(f, "validation: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Parse(e)
    }
}

pub fn load_from_file(path: &Path) -> Result<HeartbeatConfig, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    load_from_str(&contents)
}

pub fn load_from_str(yaml: &str) -> Result<HeartbeatConfig, ConfigError> {
    let mut cfg: HeartbeatConfig = serde_yaml::from_str(yaml)?;
    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok());
    validate(&cfg)?;
    Ok(cfg)
}

/// Secrets from the environment take precedence over the file.
pub fn apply_env_overrides(cfg: &mut HeartbeatConfig, lookup: impl Fn(&str) -> Option<String>) {
    let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());
    if let Some(password) = non_empty(ENV_SMTP_PASSWORD) {
        cfg.smtp.password = password;
    }
    if let Some(key) = non_empty(ENV_LLM_API_KEY) {
        cfg.llm.api_key = Some(key);
    }
    if let Some(url) = non_empty(ENV_DATABASE_URL) {
        cfg.database_url = Some(url);
    }
}

pub fn validate(cfg: &HeartbeatConfig) -> Result<(), ConfigError> {
    if cfg.interval_seconds == 0 {
        return Err(ConfigError::Validation("interval_seconds must be > 0".into()));
    }
    if cfg.window_seconds == 0 {
        return Err(ConfigError::Validation("window_seconds must be > 0".into()));
    }
    if cfg.http_timeout_seconds == 0 {
        return Err(ConfigError::Validation("http_timeout_seconds must be > 0".into()));
    }
    for (name, url) in [
        ("endpoints.metrics_url", &cfg.endpoints.metrics_url),
        ("endpoints.billing_url", &cfg.endpoints.billing_url),
        ("endpoints.registry_url", &cfg.endpoints.registry_url),
        ("llm.base_url", &cfg.llm.base_url),
    ] {
        if url.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{name} must not be empty")));
        }
    }
    if cfg.llm.model.trim().is_empty() {
        return Err(ConfigError::Validation("llm.model must not be empty".into()));
    }
    if cfg.baseline.sigma_limit <= 0.0 {
        return Err(ConfigError::Validation("baseline.sigma_limit must be > 0".into()));
    }
    if cfg.triage.investigate_sigma <= 0.0 {
        return Err(ConfigError::Validation("triage.investigate_sigma must be > 0".into()));
    }
    let c = cfg.triage.correlation_confidence;
    if !(c > 0.0 && c <= 1.0) {
        return Err(ConfigError::Validation(
            "triage.correlation_confidence must be in (0, 1]".into(),
        ));
    }
    if cfg.lookout.enabled {
        for (name, value) in [
            ("lookout.stream", &cfg.lookout.stream),
            ("lookout.subject", &cfg.lookout.subject),
            ("lookout.durable", &cfg.lookout.durable),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{name} must not be empty")));
            }
        }
        if cfg.lookout.batch_size == 0 {
            return Err(ConfigError::Validation("lookout.batch_size must be > 0".into()));
        }
    }
    if cfg.api_addr.parse::<std::net::SocketAddr>().is_err() {
        return Err(ConfigError::Validation(format!(
            "api_addr {} is not a socket address",
            cfg.api_addr
        )));
    }
    Ok(())
}
