use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use heartbeat_common::report::Report;
use heartbeat_common::snapshot::HealthSnapshot;
use heartbeat_diagnostics::{
    correlate, triage, BaselineEvaluator, Cooldown, PerStreamAnalyzer, StreamAnomaly,
    ThresholdEvaluator, TriageAction, TriagePolicy, TriageResult,
};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use super::error::CycleError;
use super::source::MetricsStreamSource;
use crate::api::AgentState;
use crate::clients::{BillingClient, MetricsClient, TenantRegistry, TimeRange, TokenCounts};
use crate::config::HeartbeatConfig;
use crate::infra::InfraMonitor;
use crate::investigate::Investigator;
use crate::observer::PlatformObserver;
use crate::reporter::Reporter;
use crate::usage::{UsageEvent, UsageSink};

pub const FLAG_ROOT_CAUSE: &str = "pending review";
pub const LOOKOUT_TRIGGER: &str = "lookout";
pub const FEDERATION_WINDOW: Duration = Duration::from_secs(24 * 3600);

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".into())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSettings {
    pub interval: Duration,
    pub window: Duration,
    pub required_tier_level: i32,
    pub baseline_retention: Duration,
    pub triage: TriagePolicy,
}

impl AgentSettings {
    pub fn from_config(cfg: &HeartbeatConfig) -> Self {
        Self {
            interval: cfg.interval(),
            window: cfg.window(),
            required_tier_level: cfg.required_tier_level,
            baseline_retention: cfg.baseline_retention(),
            triage: cfg.triage,
        }
    }
}

/// Collaborators and stores the agent drives. Nothing here is global.
pub struct AgentDeps {
    pub registry: Arc<dyn TenantRegistry>,
    pub billing: Arc<dyn BillingClient>,
    pub metrics: Arc<dyn MetricsClient>,
    pub evaluator: BaselineEvaluator,
    pub thresholds: ThresholdEvaluator,
    pub cooldown: Cooldown,
    pub investigator: Investigator,
    pub usage: Arc<dyn UsageSink>,
    pub reporter: Reporter,
    pub observer: Arc<dyn PlatformObserver>,
    pub infra: Option<InfraMonitor>,
    pub state: AgentState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibleTenant {
    pub tenant_id: String,
    pub active_streams: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenantOutcome {
    Healthy,
    Flagged { report_id: String },
    FlagSuppressed,
    Investigated { report_id: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub eligible: usize,
    pub processed: usize,
    pub failed: usize,
    pub investigations: usize,
    pub flags: usize,
    pub infra_alerts: usize,
    pub baselines_evicted: u64,
}

pub struct Agent {
    settings: AgentSettings,
    deps: AgentDeps,
    per_stream: PerStreamAnalyzer,
    stream_source: MetricsStreamSource,
}

impl Agent {
    pub fn new(settings: AgentSettings, deps: AgentDeps) -> Self {
        let per_stream = PerStreamAnalyzer::new(deps.evaluator.clone());
        let stream_source = MetricsStreamSource::new(deps.metrics.clone());
        Self {
            settings,
            deps,
            per_stream,
            stream_source,
        }
    }

    pub fn state(&self) -> &AgentState {
        &self.deps.state
    }

    /// Runs a cycle now and then on every tick until `shutdown` flips or its sender drops.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let period = self.settings.interval.max(Duration::from_secs(1));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(interval_s = period.as_secs(), "heartbeat loop started");
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }
            if *shutdown.borrow() {
                break;
            }
            self.guarded_cycle().await;
        }
        tracing::info!("heartbeat loop stopped");
    }

    /// One cycle behind a panic barrier.
    pub async fn guarded_cycle(&self) -> Option<CycleSummary> {
        let started = Instant::now();
        let outcome = AssertUnwindSafe(self.run_cycle()).catch_unwind().await;
        let m = self.deps.state.metrics();
        m.inc_cycles();
        m.record_cycle_latency(started);
        self.deps.state.set_ready(true);

        match outcome {
            Ok(summary) => {
                tracing::info!(
                    eligible = summary.eligible,
                    processed = summary.processed,
                    failed = summary.failed,
                    investigations = summary.investigations,
                    flags = summary.flags,
                    infra_alerts = summary.infra_alerts,
                    baselines_evicted = summary.baselines_evicted,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "heartbeat cycle complete"
                );
                Some(summary)
            }
            Err(panic) => {
                let msg = panic_message(&*panic);
                tracing::error!(panic = %msg, "heartbeat cycle panicked");
                m.inc_cycle_panics();
                None
            }
        }
    }

    pub async fn run_cycle(&self) -> CycleSummary {
        let mut summary = CycleSummary::default();
        let metrics = self.deps.state.metrics();

        summary.baselines_evicted = self.sweep_baselines().await;

        match self.fetch_eligible_tenants().await {
            Ok(tenants) => {
                summary.eligible = tenants.len();
                for tenant in &tenants {
                    match self.process_tenant(tenant).await {
                        Ok(outcome) => {
                            summary.processed += 1;
                            metrics.inc_tenants_processed();
                            match outcome {
                                TenantOutcome::Investigated { .. } => summary.investigations += 1,
                                TenantOutcome::Flagged { .. } => summary.flags += 1,
                                TenantOutcome::Healthy | TenantOutcome::FlagSuppressed => {}
                            }
                        }
                        Err(e) => {
                            summary.failed += 1;
                            metrics.inc_tenant_failures();
                            tracing::warn!(
                                tenant_id = %tenant.tenant_id,
                                stage = e.stage(),
                                error = %e,
                                "heartbeat processing failed"
                            );
                        }
                    }
                }
            }
            Err(e) => {
                tracing::warn!(stage = e.stage(), error = %e, "heartbeat tenant discovery failed");
            }
        }

        self.collect_federation().await;

        if let Some(infra) = &self.deps.infra {
            let alerts = infra.run().await;
            for _ in &alerts {
                metrics.inc_infra_alerts();
            }
            summary.infra_alerts = alerts.len();
        }
        summary
    }

    /// Evicts baselines past retention for every tenant, eligible or not.
    pub async fn sweep_baselines(&self) -> u64 {
        match self
            .deps
            .evaluator
            .cleanup_all(self.settings.baseline_retention)
            .await
        {
            Ok(0) => 0,
            Ok(evicted) => {
                tracing::info!(evicted, "stale baselines evicted");
                evicted
            }
            Err(e) => {
                tracing::warn!(stage = "baseline_sweep", error = %e, "baseline retention sweep failed");
                0
            }
        }
    }

    pub async fn fetch_eligible_tenants(&self) -> Result<Vec<EligibleTenant>, CycleError> {
        let tenant_ids = self.deps.registry.list_active_tenants().await?;
        let mut eligible = Vec::with_capacity(tenant_ids.len());

        for tenant_id in tenant_ids {
            if tenant_id.is_empty() {
                continue;
            }
            if !self.meets_tier(&tenant_id).await {
                continue;
            }
            let overview = match self.deps.metrics.platform_overview(&tenant_id).await {
                Ok(o) => o,
                Err(e) => {
                    tracing::warn!(tenant_id = %tenant_id, error = %e, "heartbeat stream scan failed");
                    continue;
                }
            };
            self.deps.observer.on_platform_overview(&tenant_id, &overview);
            if overview.active_streams == 0 {
                continue;
            }
            eligible.push(EligibleTenant {
                tenant_id,
                active_streams: overview.active_streams,
            });
        }
        Ok(eligible)
    }

    async fn meets_tier(&self, tenant_id: &str) -> bool {
        match self.deps.billing.billing_status(tenant_id).await {
            Ok(status) => status
                .tier_level
                .is_some_and(|tier| tier >= self.settings.required_tier_level),
            Err(e) => {
                tracing::warn!(tenant_id = %tenant_id, error = %e, "failed to fetch billing status");
                false
            }
        }
    }

    pub async fn process_tenant(&self, tenant: &EligibleTenant) -> Result<TenantOutcome, CycleError> {
        let tenant_id = tenant.tenant_id.as_str();
        let snapshot = self.load_snapshot(tenant).await?;
        let observed = snapshot.metric_map();

        let deviations = self
            .deps
            .evaluator
            .deviations(tenant_id, "", &observed)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(tenant_id = %tenant_id, stage = "deviations", error = %e, "baseline read failed");
                Vec::new()
            });
        if let Err(e) = self.deps.evaluator.update(tenant_id, "", &observed).await {
            tracing::warn!(tenant_id = %tenant_id, stage = "baseline_update", error = %e, "baseline update failed");
        }

        let violations = self.deps.thresholds.check(&snapshot);
        let correlations = correlate(&deviations);
        let result = triage(&violations, &deviations, &correlations, &self.settings.triage);

        if let Err(e) = self
            .deps
            .evaluator
            .cleanup(tenant_id, self.settings.baseline_retention)
            .await
        {
            tracing::warn!(tenant_id = %tenant_id, stage = "baseline_cleanup", error = %e, "baseline cleanup failed");
        }

        let anomalies = if result.action != TriageAction::Ok {
            self.per_stream
                .collect(&self.stream_source, tenant_id, self.settings.window)
                .await
        } else {
            Vec::new()
        };

        match result.action {
            TriageAction::Investigate => self
                .investigate(&snapshot, &result, &anomalies)
                .await
                .map(|report_id| TenantOutcome::Investigated { report_id }),
            TriageAction::Flag => Ok(self.flag(tenant_id, &result).await),
            TriageAction::Ok => {
                tracing::info!(tenant_id = %tenant_id, "heartbeat ok");
                Ok(TenantOutcome::Healthy)
            }
        }
    }

    /// Investigates an incident raised outside the heartbeat loop.
    ///
    /// Returns `Ok(None)` when the tenant is below the required tier.
    pub async fn investigate_incident(
        &self,
        tenant_id: &str,
        reason: &str,
    ) -> Result<Option<String>, CycleError> {
        if !self.meets_tier(tenant_id).await {
            return Ok(None);
        }
        let active_streams = match self.deps.metrics.platform_overview(tenant_id).await {
            Ok(overview) => overview.active_streams,
            Err(e) => {
                tracing::warn!(tenant_id = %tenant_id, stage = "platform_overview", error = %e, "stream count unavailable");
                0
            }
        };
        let tenant = EligibleTenant {
            tenant_id: tenant_id.to_string(),
            active_streams,
        };
        let snapshot = self.load_snapshot(&tenant).await?;
        let result = TriageResult {
            action: TriageAction::Investigate,
            trigger: LOOKOUT_TRIGGER.to_string(),
            reason: reason.to_string(),
            violations: Vec::new(),
            deviations: Vec::new(),
            correlations: Vec::new(),
        };
        self.investigate(&snapshot, &result, &[]).await.map(Some)
    }

    async fn load_snapshot(&self, tenant: &EligibleTenant) -> Result<HealthSnapshot, CycleError> {
        let range = TimeRange::last(self.settings.window);
        let tenant_id = tenant.tenant_id.as_str();
        let health = self
            .deps
            .metrics
            .health_summary(tenant_id, &range)
            .await?
            .ok_or_else(|| CycleError::Data("missing health snapshot".into()))?;

        let client_qoe = match self.deps.metrics.client_qoe_summary(tenant_id, &range).await {
            Ok(q) => q,
            Err(e) => {
                tracing::warn!(tenant_id = %tenant_id, stage = "client_qoe", error = %e, "client QoE fetch failed");
                None
            }
        };

        Ok(HealthSnapshot {
            tenant_id: tenant.tenant_id.clone(),
            active_streams: tenant.active_streams,
            window: self.settings.window,
            health,
            client_qoe,
        })
    }

    async fn investigate(
        &self,
        snapshot: &HealthSnapshot,
        result: &TriageResult,
        anomalies: &[StreamAnomaly],
    ) -> Result<String, CycleError> {
        let tenant_id = snapshot.tenant_id.as_str();
        let started = Instant::now();
        let investigation = self
            .deps
            .investigator
            .investigate(snapshot, result, anomalies)
            .await;

        let (tokens, failed) = match &investigation {
            Ok(inv) => (inv.tokens, false),
            Err(_) => (TokenCounts::default(), true),
        };
        let event = UsageEvent::investigation(tenant_id, tokens, started.elapsed(), failed);
        if let Err(e) = self.deps.usage.send_usage(&event).await {
            tracing::warn!(tenant_id = %tenant_id, stage = "usage", error = %e, "heartbeat usage logging failed");
        }

        let investigation = investigation.map_err(|e| CycleError::Investigation(e.to_string()))?;
        self.deps.state.metrics().inc_investigations();
        tracing::info!(
            tenant_id = %tenant_id,
            trigger = %result.trigger,
            report = %investigation.report.format_markdown(),
            "heartbeat investigation"
        );

        Ok(self.deliver(tenant_id, investigation.report).await)
    }

    async fn flag(&self, tenant_id: &str, result: &TriageResult) -> TenantOutcome {
        let metrics = self.deps.state.metrics();
        if !self.deps.cooldown.should_flag(tenant_id) {
            metrics.inc_flags_suppressed();
            tracing::debug!(tenant_id = %tenant_id, "flag suppressed by cooldown");
            return TenantOutcome::FlagSuppressed;
        }
        metrics.inc_flags();
        tracing::info!(tenant_id = %tenant_id, reason = %result.reason, "heartbeat flag");

        let report = Report {
            trigger: result.trigger.clone(),
            summary: result.reason.clone(),
            metrics_reviewed: result.deviated_metrics(),
            root_cause: FLAG_ROOT_CAUSE.to_string(),
            recommendations: Vec::new(),
        };
        let report_id = self.deliver(tenant_id, report).await;
        TenantOutcome::Flagged { report_id }
    }

    async fn deliver(&self, tenant_id: &str, report: Report) -> String {
        let (record, outcome) = self.deps.reporter.send(tenant_id, report).await;
        let metrics = self.deps.state.metrics();
        metrics.add_notifications_sent(outcome.delivered.len() as u64);
        metrics.add_notifications_failed(outcome.failed.len() as u64);
        record.id
    }

    /// Reports federation activity for every active tenant, eligible or not.
    pub async fn collect_federation(&self) {
        let tenant_ids = match self.deps.registry.list_active_tenants().await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::debug!(error = %e, "federation sweep skipped");
                return;
            }
        };
        let range = TimeRange::last(FEDERATION_WINDOW);
        for tenant_id in tenant_ids.iter().filter(|t| !t.is_empty()) {
            match self.deps.metrics.federation_summary(tenant_id, &range).await {
                Ok(Some(summary)) if summary.total_events > 0 => {
                    self.deps.observer.on_federation_summary(tenant_id, &summary);
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(tenant_id = %tenant_id, error = %e, "federation summary fetch failed");
                }
            }
        }
    }
}
