use std::fmt::Write;
use std::time::Duration;

use heartbeat_common::snapshot::HealthSnapshot;
use heartbeat_diagnostics::{StreamAnomaly, TriageResult};

/// Human form of a window: `15 minutes`, `2 hours`, `90 seconds`.
pub fn format_window(window: Duration) -> String {
    let secs = window.as_secs();
    let (n, unit) = if secs > 0 && secs % 3600 == 0 {
        (secs / 3600, "hour")
    } else if secs > 0 && secs % 60 == 0 {
        (secs / 60, "minute")
    } else {
        (secs, "second")
    };
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

pub fn build_prompt(
    snapshot: &HealthSnapshot,
    triage: &TriageResult,
    anomalies: &[StreamAnomaly],
) -> String {
    let mut b = String::new();
    let _ = writeln!(b, "Tenant: {}", snapshot.tenant_id);
    let _ = writeln!(b, "Trigger: {}", triage.trigger);
    let _ = writeln!(b, "Reason: {}", triage.reason);
    let _ = writeln!(b, "Window: last {}", format_window(snapshot.window));

    if !triage.violations.is_empty() {
        b.push_str("\nThreshold Violations:\n");
        for v in &triage.violations {
            let _ = writeln!(b, "- [{}] {}", v.severity, v.message);
        }
    }

    if !triage.deviations.is_empty() {
        b.push_str("\nBaseline Deviations:\n");
        for d in &triage.deviations {
            let _ = writeln!(b, "- {d}");
        }
    }

    if !triage.correlations.is_empty() {
        b.push_str("\nCorrelations:\n");
        for c in &triage.correlations {
            let _ = writeln!(b, "- {} (confidence {:.2})", c.hypothesis, c.confidence);
        }
    }

    if !anomalies.is_empty() {
        b.push_str("\nPer-Stream Anomalies:\n");
        for a in anomalies {
            let _ = writeln!(b, "- stream {} (max σ={:.1}):", a.stream_id, a.max_sigma);
            for d in &a.deviations {
                let _ = writeln!(b, "    {d}");
            }
            for c in &a.correlations {
                let _ = writeln!(
                    b,
                    "    correlation: {} (confidence {:.2})",
                    c.hypothesis, c.confidence
                );
            }
        }
    }

    let h = &snapshot.health;
    b.push_str("\nRaw Metrics:\n");
    let _ = writeln!(b, "- Active streams: {}", snapshot.active_streams);
    let _ = writeln!(b, "- Avg bitrate: {:.2}", h.avg_bitrate);
    let _ = writeln!(b, "- Avg FPS: {:.2}", h.avg_fps);
    let _ = writeln!(b, "- Avg buffer health: {:.2}", h.avg_buffer_health);
    let _ = writeln!(b, "- Total rebuffer count: {}", h.total_rebuffer_count);
    let _ = writeln!(b, "- Total issue count: {}", h.total_issue_count);
    let _ = writeln!(b, "- Has active issues: {}", h.has_active_issues);
    let _ = writeln!(b, "- Current quality tier: {}", h.current_quality_tier);
    if let Some(q) = &snapshot.client_qoe {
        let _ = writeln!(b, "- Avg packet loss: {:.4}", q.avg_packet_loss_rate);
        let _ = writeln!(b, "- Peak packet loss: {:.4}", q.peak_packet_loss_rate);
        let _ = writeln!(b, "- Avg bandwidth in: {:.2}", q.avg_bandwidth_in);
        let _ = writeln!(b, "- Avg bandwidth out: {:.2}", q.avg_bandwidth_out);
        let _ = writeln!(b, "- Total active sessions: {}", q.total_active_sessions);
    }
    b.push_str("\nUse tools if needed to diagnose.");
    b
}
