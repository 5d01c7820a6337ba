use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use heartbeat_common::metric_names as names;
use heartbeat_common::snapshot::MetricMap;
use heartbeat_diagnostics::{BaselineEvaluator, Cooldown};
use heartbeat_notify::MailTransport;

use super::alert::{
    render_alert, InfraAlert, InfraAlertType, CPU_THRESHOLD_PERCENT, DISK_CRITICAL_PERCENT,
    DISK_WARNING_PERCENT, MEMORY_THRESHOLD_PERCENT,
};
use crate::clients::{
    BillingClient, Cluster, ClientError, LiveNode, MetricsClient, NodePerformanceRecord,
    TenantRegistry, TimeRange,
};

pub const CLUSTER_PAGE_SIZE: u32 = 100;
pub const STALE_AFTER: Duration = Duration::from_secs(10 * 60);
pub const PERSISTENCE_WINDOW: Duration = Duration::from_secs(20 * 60);
pub const PERSISTENCE_MIN_VIOLATIONS: usize = 3;
pub const DEFAULT_INFRA_COOLDOWN: Duration = Duration::from_secs(4 * 3600);

/// True when at least `min(3, len)` five-minute windows breach `threshold`.
pub fn sustained(
    records: &[NodePerformanceRecord],
    value: impl Fn(&NodePerformanceRecord) -> f64,
    threshold: f64,
) -> bool {
    if records.is_empty() {
        return false;
    }
    let violating = records.iter().filter(|r| value(r) >= threshold).count();
    violating >= PERSISTENCE_MIN_VIOLATIONS.min(records.len())
}

/// Sweeps every active cluster's nodes for resource exhaustion.
pub struct InfraMonitor {
    registry: Arc<dyn TenantRegistry>,
    metrics: Arc<dyn MetricsClient>,
    billing: Arc<dyn BillingClient>,
    baselines: BaselineEvaluator,
    mailer: Option<Arc<dyn MailTransport>>,
    cooldown: Cooldown,
}

impl InfraMonitor {
    pub fn new(
        registry: Arc<dyn TenantRegistry>,
        metrics: Arc<dyn MetricsClient>,
        billing: Arc<dyn BillingClient>,
        baselines: BaselineEvaluator,
        mailer: Option<Arc<dyn MailTransport>>,
        cooldown: Duration,
    ) -> Self {
        Self {
            registry,
            metrics,
            billing,
            baselines,
            mailer,
            cooldown: Cooldown::new(cooldown),
        }
    }

    /// Returns the alerts that passed the cooldown.
    pub async fn run(&self) -> Vec<InfraAlert> {
        let clusters = match self.discover_clusters().await {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(stage = "cluster_discovery", error = %e, "infra sweep skipped");
                return Vec::new();
            }
        };

        let mut seen = HashSet::new();
        let mut raised = Vec::new();
        for cluster in clusters {
            if cluster.owner_tenant_id.is_empty() || !cluster.is_active {
                continue;
            }
            let nodes = match self.metrics.live_nodes(&cluster.owner_tenant_id).await {
                Ok(n) => n,
                Err(e) => {
                    tracing::warn!(cluster_id = %cluster.cluster_id, error = %e, "live nodes fetch failed");
                    continue;
                }
            };
            for node in nodes {
                if node.node_id.is_empty() || !seen.insert(node.node_id.clone()) {
                    continue;
                }
                for alert in self.check_node(&node, &cluster).await {
                    if !self.cooldown.should_flag(&alert.cooldown_key()) {
                        continue;
                    }
                    self.send_alert(&alert, &cluster.owner_tenant_id).await;
                    raised.push(alert);
                }
            }
        }
        raised
    }

    async fn discover_clusters(&self) -> Result<Vec<Cluster>, ClientError> {
        let mut all = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = self
                .registry
                .list_clusters(CLUSTER_PAGE_SIZE, cursor.as_deref())
                .await?;
            all.extend(page.clusters);
            if !page.has_next_page {
                break;
            }
            match page.end_cursor {
                Some(next) if !next.is_empty() && cursor.as_deref() != Some(next.as_str()) => {
                    cursor = Some(next);
                }
                _ => break,
            }
        }
        Ok(all)
    }

    pub async fn check_node(&self, node: &LiveNode, cluster: &Cluster) -> Vec<InfraAlert> {
        let now = Utc::now();
        if let Some(updated_at) = node.updated_at {
            let age = now.signed_duration_since(updated_at).to_std().unwrap_or(Duration::ZERO);
            if age > STALE_AFTER {
                return Vec::new();
            }
        }

        let tenant_id = cluster.owner_tenant_id.as_str();
        let cpu = node.cpu_percent;
        let memory = node.memory_percent();
        let disk = node.disk_percent();

        let mut observed = MetricMap::new();
        observed.insert(names::NODE_CPU.into(), cpu);
        observed.insert(names::NODE_MEMORY.into(), memory);
        observed.insert(names::NODE_DISK.into(), disk);
        let stream_key = format!("node:{}", node.node_id);

        let prior = self
            .baselines
            .baseline_means(tenant_id, &stream_key)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(node_id = %node.node_id, stage = "baseline_means", error = %e, "node baseline read failed");
                MetricMap::new()
            });
        let deviations = self
            .baselines
            .deviations(tenant_id, &stream_key, &observed)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(node_id = %node.node_id, stage = "deviations", error = %e, "node baseline read failed");
                Vec::new()
            });
        if let Err(e) = self.baselines.update(tenant_id, &stream_key, &observed).await {
            tracing::warn!(node_id = %node.node_id, error = %e, "node baseline update failed");
        }

        let alert = |kind: InfraAlertType, current: f64, threshold: f64, metric: &str| InfraAlert {
            node_id: node.node_id.clone(),
            cluster_id: cluster.cluster_id.clone(),
            cluster_name: cluster.cluster_name.clone(),
            kind,
            current,
            threshold,
            baseline: prior.get(metric).copied().unwrap_or(0.0),
            detected_at: now,
        };

        let mut alerts = Vec::new();
        let needs_history = cpu >= CPU_THRESHOLD_PERCENT || memory >= MEMORY_THRESHOLD_PERCENT;
        let history = if needs_history {
            self.recent_performance(tenant_id, &node.node_id).await
        } else {
            Vec::new()
        };

        if cpu >= CPU_THRESHOLD_PERCENT && sustained(&history, |r| r.avg_cpu, CPU_THRESHOLD_PERCENT) {
            alerts.push(alert(InfraAlertType::CpuStuck, cpu, CPU_THRESHOLD_PERCENT, names::NODE_CPU));
        }
        if memory >= MEMORY_THRESHOLD_PERCENT
            && sustained(&history, |r| r.avg_memory, MEMORY_THRESHOLD_PERCENT)
        {
            alerts.push(alert(
                InfraAlertType::MemoryExhaustion,
                memory,
                MEMORY_THRESHOLD_PERCENT,
                names::NODE_MEMORY,
            ));
        }
        if disk >= DISK_CRITICAL_PERCENT {
            alerts.push(alert(InfraAlertType::DiskCritical, disk, DISK_CRITICAL_PERCENT, names::NODE_DISK));
        } else if disk >= DISK_WARNING_PERCENT {
            alerts.push(alert(InfraAlertType::DiskWarning, disk, DISK_WARNING_PERCENT, names::NODE_DISK));
        }

        if alerts.is_empty() {
            for d in &deviations {
                tracing::info!(
                    node_id = %node.node_id,
                    cluster_id = %cluster.cluster_id,
                    metric = %d.metric,
                    current = d.current,
                    baseline = d.baseline,
                    sigma = d.sigma,
                    direction = %d.direction,
                    "node baseline deviation"
                );
            }
        }
        alerts
    }

    async fn recent_performance(&self, tenant_id: &str, node_id: &str) -> Vec<NodePerformanceRecord> {
        let range = TimeRange::last(PERSISTENCE_WINDOW);
        match self.metrics.node_performance_5m(tenant_id, node_id, &range).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(node_id = %node_id, error = %e, "persistence check failed");
                Vec::new()
            }
        }
    }

    async fn send_alert(&self, alert: &InfraAlert, cluster_owner: &str) {
        let Some(mailer) = &self.mailer else {
            tracing::warn!(node_id = %alert.node_id, alert_type = %alert.kind, "SMTP not configured, skipping infra alert email");
            return;
        };
        let recipient = self.resolve_owner_email(&alert.node_id, cluster_owner).await;
        if recipient.is_empty() {
            tracing::warn!(node_id = %alert.node_id, "no owner email found, skipping infra alert");
            return;
        }

        match mailer.send_html(&recipient, &alert.subject(), render_alert(alert)).await {
            Ok(()) => tracing::info!(
                node_id = %alert.node_id,
                alert_type = %alert.kind,
                severity = alert.severity(),
                "infrastructure alert email sent"
            ),
            Err(e) => tracing::error!(node_id = %alert.node_id, error = %e, "failed to send infra alert email"),
        }
    }

    async fn resolve_owner_email(&self, node_id: &str, fallback_tenant: &str) -> String {
        let tenant_id = match self.registry.node_owner(node_id).await {
            Ok(owner) if !owner.owner_tenant_id.is_empty() => owner.owner_tenant_id,
            _ => fallback_tenant.to_string(),
        };
        if tenant_id.is_empty() {
            return String::new();
        }
        match self.billing.billing_status(&tenant_id).await {
            Ok(status) => status.billing_email,
            Err(e) => {
                tracing::warn!(tenant_id = %tenant_id, error = %e, "billing status lookup failed");
                String::new()
            }
        }
    }
}
