use std::fmt::Write;

use super::heartbeat_metrics::HeartbeatMetrics;

pub fn render_prometheus(m: &HeartbeatMetrics) -> String {
    let mut out = String::with_capacity(1024);

    write_counter(&mut out, "heartbeat_cycles_total", m.cycles_val());
    write_counter(&mut out, "heartbeat_cycle_panics_total", m.cycle_panics_val());
    write_counter(&mut out, "heartbeat_tenants_processed_total", m.tenants_processed_val());
    write_counter(&mut out, "heartbeat_tenant_failures_total", m.tenant_failures_val());
    write_counter(&mut out, "heartbeat_investigations_total", m.investigations_val());
    write_counter(&mut out, "heartbeat_flags_total", m.flags_val());
    write_counter(&mut out, "heartbeat_flags_suppressed_total", m.flags_suppressed_val());
    write_counter(&mut out, "heartbeat_notifications_sent_total", m.notifications_sent_val());
    write_counter(&mut out, "heartbeat_notifications_failed_total", m.notifications_failed_val());
    write_counter(&mut out, "heartbeat_infra_alerts_total", m.infra_alerts_val());
    write_counter(&mut out, "heartbeat_lookout_incidents_total", m.lookout_incidents_val());

    let (sum, count) = m.cycle_latency_vals();
    write_summary(&mut out, "heartbeat_cycle_latency_us", sum, count);

    out
}

fn write_counter(out: &mut String, name: &str, val: u64) {
    let _ = writeln!(out, "# TYPE {name} counter");
    let _ = writeln!(out, "{name} {val}");
}

fn write_summary(out: &mut String, name: &str, sum: u64, count: u64) {
    let _ = writeln!(out, "# TYPE {name} summary");
    let _ = writeln!(out, "{name}_sum {sum}");
    let _ = writeln!(out, "{name}_count {count}");
}
