#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use heartbeat_agent::api::AgentState;
use heartbeat_agent::clients::{
    BillingClient, BillingStatus, ChatMessage, ClientError, ClusterPage, FederationSummary,
    LiveNode, MetricsClient, NodeOwner, NodePerformanceRecord, PlatformOverview, Reasoner,
    Reasoning, TenantRegistry, TimeRange, TokenCounts,
};
use heartbeat_agent::config::NotificationsConfig;
use heartbeat_agent::investigate::Investigator;
use heartbeat_agent::metrics::HeartbeatMetrics;
use heartbeat_agent::observer::PlatformObserver;
use heartbeat_agent::reporter::Reporter;
use heartbeat_agent::scheduler::{Agent, AgentDeps, AgentSettings};
use heartbeat_agent::usage::InMemoryUsageSink;
use heartbeat_common::snapshot::{ClientQoeSummary, HealthSummary, StreamHealthPage};
use heartbeat_diagnostics::baseline::BaselineMap;
use heartbeat_diagnostics::{
    BaselineError, BaselineEvaluator, BaselineStore, Cooldown, InMemoryBaselineStore, Severity,
    ThresholdConfig, ThresholdEvaluator, ThresholdRule, TriagePolicy,
};
use heartbeat_notify::{
    Dispatcher, InMemoryLiveUpdatePublisher, InMemoryReportStore, LiveUpdateNotifier,
    MailTransport, NotifyError, PersistedStoreNotifier,
};

#[derive(Default)]
pub struct FakeRegistry {
    pub tenants: Vec<String>,
    pub cluster_pages: Vec<ClusterPage>,
    pub owners: HashMap<String, String>,
    pub cluster_calls: AtomicUsize,
    pub panic_on_list: bool,
}

#[async_trait]
impl TenantRegistry for FakeRegistry {
    async fn list_active_tenants(&self) -> Result<Vec<String>, ClientError> {
        if self.panic_on_list {
            panic!("registry exploded");
        }
        Ok(self.tenants.clone())
    }

    async fn list_clusters(&self, _first: u32, _after: Option<&str>) -> Result<ClusterPage, ClientError> {
        let i = self.cluster_calls.fetch_add(1, Ordering::SeqCst);
        if self.cluster_pages.is_empty() {
            return Ok(ClusterPage::default());
        }
        Ok(self.cluster_pages[i.min(self.cluster_pages.len() - 1)].clone())
    }

    async fn node_owner(&self, node_id: &str) -> Result<NodeOwner, ClientError> {
        self.owners
            .get(node_id)
            .map(|owner| NodeOwner {
                owner_tenant_id: owner.clone(),
            })
            .ok_or(ClientError::Status(404))
    }
}

#[derive(Default)]
pub struct FakeBilling {
    pub statuses: HashMap<String, BillingStatus>,
    pub panic_on_lookup: bool,
}

impl FakeBilling {
    pub fn with(mut self, tenant: &str, tier: Option<i32>, email: &str) -> Self {
        self.statuses.insert(
            tenant.to_string(),
            BillingStatus {
                tier_level: tier,
                billing_email: email.to_string(),
                billing_company: format!("{tenant} inc"),
            },
        );
        self
    }
}

#[async_trait]
impl BillingClient for FakeBilling {
    async fn billing_status(&self, tenant_id: &str) -> Result<BillingStatus, ClientError> {
        if self.panic_on_lookup {
            panic!("billing exploded");
        }
        self.statuses
            .get(tenant_id)
            .cloned()
            .ok_or_else(|| ClientError::Unavailable("billing".into()))
    }
}

#[derive(Default)]
pub struct FakeMetrics {
    pub overviews: HashMap<String, PlatformOverview>,
    pub health: HashMap<String, HealthSummary>,
    pub federation: HashMap<String, FederationSummary>,
    pub nodes: HashMap<String, Vec<LiveNode>>,
    pub performance: Vec<NodePerformanceRecord>,
    pub performance_calls: AtomicUsize,
}

impl FakeMetrics {
    pub fn tenant(mut self, tenant: &str, active_streams: u64, health: HealthSummary) -> Self {
        self.overviews.insert(
            tenant.to_string(),
            PlatformOverview {
                active_streams,
                ..Default::default()
            },
        );
        self.health.insert(tenant.to_string(), health);
        self
    }
}

#[async_trait]
impl MetricsClient for FakeMetrics {
    async fn health_summary(
        &self,
        tenant_id: &str,
        _range: &TimeRange,
    ) -> Result<Option<HealthSummary>, ClientError> {
        Ok(self.health.get(tenant_id).cloned())
    }

    async fn client_qoe_summary(
        &self,
        _tenant_id: &str,
        _range: &TimeRange,
    ) -> Result<Option<ClientQoeSummary>, ClientError> {
        Err(ClientError::Status(503))
    }

    async fn platform_overview(&self, tenant_id: &str) -> Result<PlatformOverview, ClientError> {
        Ok(self.overviews.get(tenant_id).cloned().unwrap_or_default())
    }

    async fn stream_health_metrics(
        &self,
        _tenant_id: &str,
        _range: &TimeRange,
        _first: u32,
        _after: Option<&str>,
    ) -> Result<StreamHealthPage, ClientError> {
        Ok(StreamHealthPage::default())
    }

    async fn federation_summary(
        &self,
        tenant_id: &str,
        _range: &TimeRange,
    ) -> Result<Option<FederationSummary>, ClientError> {
        Ok(self.federation.get(tenant_id).cloned())
    }

    async fn live_nodes(&self, tenant_id: &str) -> Result<Vec<LiveNode>, ClientError> {
        Ok(self.nodes.get(tenant_id).cloned().unwrap_or_default())
    }

    async fn node_performance_5m(
        &self,
        _tenant_id: &str,
        _node_id: &str,
        _range: &TimeRange,
    ) -> Result<Vec<NodePerformanceRecord>, ClientError> {
        self.performance_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.performance.clone())
    }
}

pub struct ScriptedReasoner(pub String);

#[async_trait]
impl Reasoner for ScriptedReasoner {
    async fn run(&self, _messages: &[ChatMessage]) -> Result<Reasoning, ClientError> {
        Ok(Reasoning {
            content: self.0.clone(),
            tokens: TokenCounts {
                input: 800,
                output: 200,
            },
        })
    }
}

#[derive(Default)]
pub struct RecordingObserver {
    pub overviews: Mutex<Vec<String>>,
    pub federations: Mutex<Vec<String>>,
}

impl PlatformObserver for RecordingObserver {
    fn on_platform_overview(&self, tenant_id: &str, _overview: &PlatformOverview) {
        self.overviews.lock().unwrap().push(tenant_id.to_string());
    }

    fn on_federation_summary(&self, tenant_id: &str, _summary: &FederationSummary) {
        self.federations.lock().unwrap().push(tenant_id.to_string());
    }
}

#[derive(Default)]
pub struct Outbox {
    pub sent: Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl MailTransport for Outbox {
    async fn send_html(&self, to: &str, subject: &str, html: String) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string(), html));
        Ok(())
    }
}

/// In-memory baselines whose reads and cleanups can be switched to fail.
#[derive(Default)]
pub struct FailingBaselineStore {
    pub inner: InMemoryBaselineStore,
    pub fail_reads: AtomicBool,
    pub fail_cleanup: AtomicBool,
    pub cleanup_calls: AtomicUsize,
}

impl FailingBaselineStore {
    pub fn failing_reads() -> Self {
        let store = Self::default();
        store.fail_reads.store(true, Ordering::SeqCst);
        store
    }

    pub fn failing_cleanup() -> Self {
        let store = Self::default();
        store.fail_cleanup.store(true, Ordering::SeqCst);
        store
    }
}

#[async_trait]
impl BaselineStore for FailingBaselineStore {
    async fn get(&self, tenant_id: &str, stream_key: &str) -> Result<BaselineMap, BaselineError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(BaselineError::Store("read refused".into()));
        }
        self.inner.get(tenant_id, stream_key).await
    }

    async fn upsert(
        &self,
        tenant_id: &str,
        stream_key: &str,
        baselines: &BaselineMap,
    ) -> Result<(), BaselineError> {
        self.inner.upsert(tenant_id, stream_key, baselines).await
    }

    async fn cleanup_stale(&self, tenant_id: &str, cutoff: DateTime<Utc>) -> Result<u64, BaselineError> {
        self.cleanup_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_cleanup.load(Ordering::SeqCst) {
            return Err(BaselineError::Sql("cleanup refused".into()));
        }
        self.inner.cleanup_stale(tenant_id, cutoff).await
    }

    async fn cleanup_stale_all(&self, cutoff: DateTime<Utc>) -> Result<u64, BaselineError> {
        self.cleanup_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_cleanup.load(Ordering::SeqCst) {
            return Err(BaselineError::Sql("cleanup refused".into()));
        }
        self.inner.cleanup_stale_all(cutoff).await
    }
}

pub fn healthy(avg_bitrate: f64) -> HealthSummary {
    HealthSummary {
        avg_bitrate,
        avg_fps: 30.0,
        avg_buffer_health: 0.0,
        total_rebuffer_count: 0,
        total_issue_count: 0,
        has_active_issues: false,
        current_quality_tier: "1080p".into(),
    }
}

/// Default thresholds with the bitrate floor lowered to kbps scale.
pub fn thresholds() -> ThresholdConfig {
    ThresholdConfig {
        min_bitrate: ThresholdRule {
            limit: 1000.0,
            severity: Severity::Critical,
        },
        ..Default::default()
    }
}

pub async fn seed_bitrate(evaluator: &BaselineEvaluator, tenant: &str, samples: usize) {
    for i in 0..samples {
        let value = if i % 2 == 0 { 2950.0 } else { 3050.0 };
        let mut m = heartbeat_common::snapshot::MetricMap::new();
        m.insert("avg_bitrate".into(), value);
        evaluator.update(tenant, "", &m).await.unwrap();
    }
}

pub struct Harness {
    pub agent: Agent,
    pub state: AgentState,
    pub evaluator: BaselineEvaluator,
    pub reports: InMemoryReportStore,
    pub live: InMemoryLiveUpdatePublisher,
    pub usage: InMemoryUsageSink,
    pub observer: Arc<RecordingObserver>,
}

pub fn settings() -> AgentSettings {
    AgentSettings {
        interval: Duration::from_secs(3600),
        window: Duration::from_secs(900),
        required_tier_level: 3,
        baseline_retention: Duration::from_secs(7 * 24 * 3600),
        triage: TriagePolicy::default(),
    }
}

pub fn harness(registry: FakeRegistry, billing: FakeBilling, metrics: FakeMetrics) -> Harness {
    harness_with_store(registry, billing, metrics, Arc::new(InMemoryBaselineStore::new()))
}

pub fn harness_with_store(
    registry: FakeRegistry,
    billing: FakeBilling,
    metrics: FakeMetrics,
    store: Arc<dyn BaselineStore>,
) -> Harness {
    let billing = Arc::new(billing);
    let evaluator = BaselineEvaluator::new(store, 2.0, 5);
    let reports = InMemoryReportStore::new();
    let live = InMemoryLiveUpdatePublisher::new();
    let usage = InMemoryUsageSink::new();
    let observer = Arc::new(RecordingObserver::default());
    let state = AgentState::new(HeartbeatMetrics::new());

    let dispatcher = Dispatcher::new()
        .with_channel(Arc::new(PersistedStoreNotifier::new(Arc::new(reports.clone()))))
        .with_channel(Arc::new(LiveUpdateNotifier::new(Arc::new(live.clone()))));
    let reporter = Reporter::new(
        billing.clone(),
        dispatcher,
        "https://app.example.test",
        NotificationsConfig::default(),
    );
    let reasoner = ScriptedReasoner(
        r#"Here is the report: {"summary": "bitrate collapse on ingest", "metrics_reviewed": ["avg_bitrate"], "root_cause": "encoder starved", "recommendations": [{"text": "check encoder", "confidence": "high"}]}"#
            .into(),
    );

    let agent = Agent::new(
        settings(),
        AgentDeps {
            registry: Arc::new(registry),
            billing,
            metrics: Arc::new(metrics),
            evaluator: evaluator.clone(),
            thresholds: ThresholdEvaluator::new(thresholds()),
            cooldown: Cooldown::new(Duration::from_secs(7200)),
            investigator: Investigator::new(Arc::new(reasoner)),
            usage: Arc::new(usage.clone()),
            reporter,
            observer: observer.clone(),
            infra: None,
            state: state.clone(),
        },
    );

    Harness {
        agent,
        state,
        evaluator,
        reports,
        live,
        usage,
        observer,
    }
}
