use std::fmt::{self, Write};

use chrono::{DateTime, Utc};
use heartbeat_notify::email::escape_html;

pub const CPU_THRESHOLD_PERCENT: f64 = 95.0;
pub const MEMORY_THRESHOLD_PERCENT: f64 = 95.0;
pub const DISK_WARNING_PERCENT: f64 = 90.0;
pub const DISK_CRITICAL_PERCENT: f64 = 95.0;

const DETECTED_AT_FORMAT: &str = "%B %-d, %Y at %-I:%M %p UTC";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfraAlertType {
    CpuStuck,
    MemoryExhaustion,
    DiskWarning,
    DiskCritical,
}

impl InfraAlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CpuStuck => "cpu_stuck",
            Self::MemoryExhaustion => "memory_exhaustion",
            Self::DiskWarning => "disk_warning",
            Self::DiskCritical => "disk_critical",
        }
    }

    pub fn severity(&self) -> &'static str {
        match self {
            Self::DiskWarning => "WARNING",
            _ => "CRITICAL",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::CpuStuck => "CPU Usage",
            Self::MemoryExhaustion => "Memory Usage",
            Self::DiskWarning | Self::DiskCritical => "Disk Usage",
        }
    }

    pub fn action_item(&self) -> &'static str {
        match self {
            Self::CpuStuck => "Restart the media server process or reboot the node.",
            Self::MemoryExhaustion => "Check for memory leaks. Consider restarting services on the node.",
            Self::DiskWarning => "Free up disk space or expand storage. Recording and DVR may fail.",
            Self::DiskCritical => {
                "Immediate action required. The node may become unresponsive if disk fills completely."
            }
        }
    }
}

impl fmt::Display for InfraAlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfraAlert {
    pub node_id: String,
    pub cluster_id: String,
    pub cluster_name: String,
    pub kind: InfraAlertType,
    pub current: f64,
    pub threshold: f64,
    /// Rolling average before this observation, 0 when unknown.
    pub baseline: f64,
    pub detected_at: DateTime<Utc>,
}

impl InfraAlert {
    pub fn severity(&self) -> &'static str {
        self.kind.severity()
    }

    pub fn cooldown_key(&self) -> String {
        format!("infra:{}:{}", self.node_id, self.kind)
    }

    pub fn subject(&self) -> String {
        format!(
            "Infrastructure Alert: {} on {}/{}",
            self.severity(),
            self.cluster_name,
            self.node_id
        )
    }
}

pub fn render_alert(alert: &InfraAlert) -> String {
    let mut html = String::new();
    html.push_str(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"UTF-8\"><title>Infrastructure Alert</title></head>\n\
         <body style=\"font-family: Arial, sans-serif; line-height: 1.6; color: #333;\">\n\
         <div style=\"max-width: 640px; margin: 0 auto; padding: 24px;\">\n",
    );

    let (color, banner) = if alert.severity() == "CRITICAL" {
        ("#e74c3c", "CRITICAL Infrastructure Alert")
    } else {
        ("#e67e22", "Infrastructure Warning")
    };
    let _ = writeln!(
        html,
        "<div style=\"background-color: {color}; color: white; padding: 14px 20px; border-radius: 6px;\"><strong>{banner}</strong></div>"
    );
    html.push_str("<p>An infrastructure issue was detected on your cluster.</p>\n");

    let _ = writeln!(
        html,
        "<table style=\"width: 100%; border-collapse: collapse; margin: 20px 0;\">\n\
         <tr><th style=\"text-align: left;\">Cluster</th><td><strong>{}</strong> ({})</td></tr>\n\
         <tr><th style=\"text-align: left;\">Node</th><td><code>{}</code></td></tr>\n</table>",
        escape_html(&alert.cluster_name),
        escape_html(&alert.cluster_id),
        escape_html(&alert.node_id),
    );

    html.push_str(
        "<h3 style=\"color: #2c3e50;\">Issue Detected</h3>\n<table style=\"width: 100%; border-collapse: collapse;\">\n\
         <tr><th style=\"text-align: left;\">Resource</th><th style=\"text-align: left;\">Current</th>\
         <th style=\"text-align: left;\">Threshold</th><th style=\"text-align: left;\">Status</th></tr>\n",
    );
    let _ = writeln!(
        html,
        "<tr><td>{}</td><td><strong>{:.1}%</strong></td><td>{:.1}%</td><td style=\"color: {color}; font-weight: bold;\">{}</td></tr>",
        alert.kind.label(),
        alert.current,
        alert.threshold,
        alert.severity(),
    );
    if alert.baseline > 0.0 {
        let _ = writeln!(
            html,
            "<tr><td colspan=\"4\" style=\"color: #6c757d; font-size: 12px;\">Baseline average: {:.1}%</td></tr>",
            alert.baseline
        );
    }
    html.push_str("</table>\n");

    let _ = writeln!(
        html,
        "<h3 style=\"color: #2c3e50;\">What To Do</h3>\n<ul style=\"padding-left: 20px;\"><li>{}</li></ul>",
        alert.kind.action_item()
    );
    let _ = writeln!(
        html,
        "<p style=\"color: #6c757d; font-size: 12px;\">Detected at {}<br>This alert will not repeat for 4 hours.</p>",
        alert.detected_at.format(DETECTED_AT_FORMAT)
    );
    html.push_str("</div>\n</body>\n</html>\n");
    html
}
