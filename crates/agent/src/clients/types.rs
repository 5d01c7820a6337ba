use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// The window ending now.
    pub fn last(window: Duration) -> Self {
        let end = Utc::now();
        let span = chrono::Duration::from_std(window).unwrap_or_else(|_| chrono::Duration::zero());
        Self {
            start: end - span,
            end,
        }
    }

    pub fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("start", self.start.to_rfc3339()),
            ("end", self.end.to_rfc3339()),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformOverview {
    #[serde(default)]
    pub active_streams: u64,
    #[serde(default)]
    pub total_streams: u64,
    #[serde(default)]
    pub total_viewers: u64,
    #[serde(default)]
    pub peak_bandwidth: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FederationSummary {
    #[serde(default)]
    pub total_events: u64,
    #[serde(default)]
    pub origin_pulls: u64,
    #[serde(default)]
    pub remote_viewers: u64,
    #[serde(default)]
    pub peer_clusters: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillingStatus {
    #[serde(default)]
    pub tier_level: Option<i32>,
    #[serde(default)]
    pub billing_email: String,
    #[serde(default)]
    pub billing_company: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub cluster_id: String,
    #[serde(default)]
    pub cluster_name: String,
    #[serde(default)]
    pub owner_tenant_id: String,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterPage {
    #[serde(default)]
    pub clusters: Vec<Cluster>,
    #[serde(default)]
    pub end_cursor: Option<String>,
    #[serde(default)]
    pub has_next_page: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiveNode {
    pub node_id: String,
    #[serde(default)]
    pub cpu_percent: f64,
    #[serde(default)]
    pub ram_used_bytes: u64,
    #[serde(default)]
    pub ram_total_bytes: u64,
    #[serde(default)]
    pub disk_used_bytes: u64,
    #[serde(default)]
    pub disk_total_bytes: u64,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl LiveNode {
    pub fn memory_percent(&self) -> f64 {
        percent(self.ram_used_bytes, self.ram_total_bytes)
    }

    pub fn disk_percent(&self) -> f64 {
        percent(self.disk_used_bytes, self.disk_total_bytes)
    }
}

fn percent(used: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        used as f64 / total as f64 * 100.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodePerformanceRecord {
    #[serde(default)]
    pub avg_cpu: f64,
    #[serde(default)]
    pub avg_memory: f64,
    #[serde(default)]
    pub bucket_start: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeOwner {
    #[serde(default)]
    pub owner_tenant_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_percentages() {
        let node = LiveNode {
            node_id: "n1".into(),
            ram_used_bytes: 3,
            ram_total_bytes: 4,
            disk_used_bytes: 10,
            disk_total_bytes: 0,
            ..Default::default()
        };
        assert!((node.memory_percent() - 75.0).abs() < 1e-9);
        assert_eq!(node.disk_percent(), 0.0);
    }

    #[test]
    fn time_range_spans_window() {
        let range = TimeRange::last(Duration::from_secs(900));
        assert_eq!((range.end - range.start).num_seconds(), 900);
        assert_eq!(range.query()[0].0, "start");
    }

    #[test]
    fn billing_status_tolerates_missing_fields() {
        let status: BillingStatus = serde_json::from_str(r#"{"tier_level": 3}"#).unwrap();
        assert_eq!(status.tier_level, Some(3));
        assert!(status.billing_email.is_empty());
    }
}
