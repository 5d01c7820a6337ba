use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug)]
pub struct HeartbeatMetrics {
    cycles: AtomicU64,
    cycle_panics: AtomicU64,
    tenants_processed: AtomicU64,
    tenant_failures: AtomicU64,
    investigations: AtomicU64,
    flags: AtomicU64,
    flags_suppressed: AtomicU64,
    notifications_sent: AtomicU64,
    notifications_failed: AtomicU64,
    infra_alerts: AtomicU64,
    lookout_incidents: AtomicU64,
    cycle_latency_sum_us: AtomicU64,
    cycle_latency_count: AtomicU64,
}

impl HeartbeatMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            cycles: AtomicU64::new(0),
            cycle_panics: AtomicU64::new(0),
            tenants_processed: AtomicU64::new(0),
            tenant_failures: AtomicU64::new(0),
            investigations: AtomicU64::new(0),
            flags: AtomicU64::new(0),
            flags_suppressed: AtomicU64::new(0),
            notifications_sent: AtomicU64::new(0),
            notifications_failed: AtomicU64::new(0),
            infra_alerts: AtomicU64::new(0),
            lookout_incidents: AtomicU64::new(0),
            cycle_latency_sum_us: AtomicU64::new(0),
            cycle_latency_count: AtomicU64::new(0),
        })
    }

    pub fn inc_cycles(&self) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_cycle_panics(&self) {
        self.cycle_panics.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_tenants_processed(&self) {
        self.tenants_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_tenant_failures(&self) {
        self.tenant_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_investigations(&self) {
        self.investigations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_flags(&self) {
        self.flags.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_flags_suppressed(&self) {
        self.flags_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_notifications_sent(&self, count: u64) {
        self.notifications_sent.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_notifications_failed(&self, count: u64) {
        self.notifications_failed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn inc_infra_alerts(&self) {
        self.infra_alerts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_lookout_incidents(&self) {
        self.lookout_incidents.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cycle_latency(&self, start: Instant) {
        let us = start.elapsed().as_micros() as u64;
        self.cycle_latency_sum_us.fetch_add(us, Ordering::Relaxed);
        self.cycle_latency_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cycles_val(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    pub fn cycle_panics_val(&self) -> u64 {
        self.cycle_panics.load(Ordering::Relaxed)
    }

    pub fn tenants_processed_val(&self) -> u64 {
        self.tenants_processed.load(Ordering::Relaxed)
    }

    pub fn tenant_failures_val(&self) -> u64 {
        self.tenant_failures.load(Ordering::Relaxed)
    }

    pub fn investigations_val(&self) -> u64 {
        self.investigations.load(Ordering::Relaxed)
    }

    pub fn flags_val(&self) -> u64 {
        self.flags.load(Ordering::Relaxed)
    }

    pub fn flags_suppressed_val(&self) -> u64 {
        self.flags_suppressed.load(Ordering::Relaxed)
    }

    pub fn notifications_sent_val(&self) -> u64 {
        self.notifications_sent.load(Ordering::Relaxed)
    }

    pub fn notifications_failed_val(&self) -> u64 {
        self.notifications_failed.load(Ordering::Relaxed)
    }

    pub fn infra_alerts_val(&self) -> u64 {
        self.infra_alerts.load(Ordering::Relaxed)
    }

    pub fn lookout_incidents_val(&self) -> u64 {
        self.lookout_incidents.load(Ordering::Relaxed)
    }

    pub fn cycle_latency_vals(&self) -> (u64, u64) {
        (
            self.cycle_latency_sum_us.load(Ordering::Relaxed),
            self.cycle_latency_count.load(Ordering::Relaxed),
        )
    }
}
