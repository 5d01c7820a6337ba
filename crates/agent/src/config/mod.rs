mod loader;
mod schema;

pub use loader::{apply_env_overrides, load_from_file, load_from_str, validate, ConfigError};
pub use schema::{
    BaselineSettings, EndpointsConfig, HeartbeatConfig, InfraConfig, LlmConfig, LookoutConfig,
    NotificationsConfig,
};
