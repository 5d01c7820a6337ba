pub mod exposition;
pub mod heartbeat_metrics;

pub use exposition::render_prometheus;
pub use heartbeat_metrics::HeartbeatMetrics;
