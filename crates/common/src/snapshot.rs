use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::metric_names as names;

pub type MetricMap = BTreeMap<String, f64>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthSummary {
    #[serde(default)]
    pub avg_bitrate: f64,
    #[serde(default)]
    pub avg_fps: f64,
    #[serde(default)]
    pub avg_buffer_health: f64,
    #[serde(default)]
    pub total_rebuffer_count: u64,
    #[serde(default)]
    pub total_issue_count: u64,
    #[serde(default)]
    pub has_active_issues: bool,
    #[serde(default)]
    pub current_quality_tier: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientQoeSummary {
    #[serde(default)]
    pub avg_packet_loss_rate: f64,
    #[serde(default)]
    pub peak_packet_loss_rate: f64,
    #[serde(default)]
    pub avg_bandwidth_in: f64,
    #[serde(default)]
    pub avg_bandwidth_out: f64,
    #[serde(default)]
    pub total_active_sessions: u64,
}

/// Aggregate view of one tenant over the summary window.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthSnapshot {
    pub tenant_id: String,
    pub active_streams: u64,
    pub window: Duration,
    pub health: HealthSummary,
    pub client_qoe: Option<ClientQoeSummary>,
}

impl HealthSnapshot {
    pub fn metric_map(&self) -> MetricMap {
        let mut m = MetricMap::new();
        let h = &self.health;
        m.insert(names::AVG_BITRATE.into(), h.avg_bitrate);
        m.insert(names::AVG_FPS.into(), h.avg_fps);
        m.insert(names::AVG_BUFFER_HEALTH.into(), h.avg_buffer_health);
        m.insert(names::TOTAL_REBUFFER_COUNT.into(), h.total_rebuffer_count as f64);
        m.insert(names::TOTAL_ISSUE_COUNT.into(), h.total_issue_count as f64);

        if let Some(q) = &self.client_qoe {
            m.insert(names::AVG_PACKET_LOSS.into(), q.avg_packet_loss_rate);
            m.insert(names::AVG_BANDWIDTH_IN.into(), q.avg_bandwidth_in);
            m.insert(names::AVG_BANDWIDTH_OUT.into(), q.avg_bandwidth_out);
            m.insert(names::TOTAL_ACTIVE_SESSIONS.into(), q.total_active_sessions as f64);
        }
        m
    }
}

/// One per-stream record returned by the metrics service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamHealthRecord {
    pub stream_id: String,
    #[serde(default)]
    pub bitrate: f64,
    #[serde(default)]
    pub fps: f64,
    #[serde(default)]
    pub buffer_health: f64,
}

/// One page of per-stream records with its continuation cursor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamHealthPage {
    #[serde(default)]
    pub records: Vec<StreamHealthRecord>,
    #[serde(default)]
    pub end_cursor: Option<String>,
    #[serde(default)]
    pub has_next_page: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(qoe: Option<ClientQoeSummary>) -> HealthSnapshot {
        HealthSnapshot {
            tenant_id: "t1".into(),
            active_streams: 3,
            window: Duration::from_secs(900),
            health: HealthSummary {
                avg_bitrate: 3000.0,
                avg_fps: 30.0,
                avg_buffer_health: 2.5,
                total_rebuffer_count: 4,
                total_issue_count: 0,
                has_active_issues: false,
                current_quality_tier: "1080p".into(),
            },
            client_qoe: qoe,
        }
    }

    #[test]
    fn metric_map_without_qoe() {
        let m = snapshot(None).metric_map();
        assert_eq!(m.len(), 5);
        assert_eq!(m["avg_bitrate"], 3000.0);
        assert_eq!(m["total_rebuffer_count"], 4.0);
        assert!(!m.contains_key("avg_packet_loss"));
    }

    #[test]
    fn metric_map_with_qoe() {
        let m = snapshot(Some(ClientQoeSummary {
            avg_packet_loss_rate: 0.01,
            avg_bandwidth_in: 100.0,
            avg_bandwidth_out: 200.0,
            total_active_sessions: 12,
            ..Default::default()
        }))
        .metric_map();
        assert_eq!(m.len(), 9);
        assert_eq!(m["avg_packet_loss"], 0.01);
        assert_eq!(m["total_active_sessions"], 12.0);
    }

    #[test]
    fn summary_deserializes_with_missing_fields() {
        let h: HealthSummary = serde_json::from_str(r#"{"avg_fps": 29.97}"#).unwrap();
        assert_eq!(h.avg_fps, 29.97);
        assert_eq!(h.total_issue_count, 0);
    }
}
