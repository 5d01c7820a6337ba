use crate::clients::{FederationSummary, PlatformOverview};

/// Hook for per-cycle platform data the scheduler already fetches.
pub trait PlatformObserver: Send + Sync {
    fn on_platform_overview(&self, _tenant_id: &str, _overview: &PlatformOverview) {}

    fn on_federation_summary(&self, _tenant_id: &str, _summary: &FederationSummary) {}
}

pub struct NoopObserver;

impl PlatformObserver for NoopObserver {}

/// Emits each observation as a structured log line.
pub struct LoggingObserver;

impl PlatformObserver for LoggingObserver {
    fn on_platform_overview(&self, tenant_id: &str, overview: &PlatformOverview) {
        tracing::debug!(
            tenant_id = %tenant_id,
            active_streams = overview.active_streams,
            total_streams = overview.total_streams,
            total_viewers = overview.total_viewers,
            peak_bandwidth = overview.peak_bandwidth,
            "platform overview"
        );
    }

    fn on_federation_summary(&self, tenant_id: &str, summary: &FederationSummary) {
        tracing::info!(
            tenant_id = %tenant_id,
            total_events = summary.total_events,
            origin_pulls = summary.origin_pulls,
            remote_viewers = summary.remote_viewers,
            peer_clusters = summary.peer_clusters.len(),
            "federation summary"
        );
    }
}
