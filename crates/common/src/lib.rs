pub mod metric_names;
pub mod nats_config;
pub mod report;
pub mod retry;
pub mod snapshot;
