use heartbeat_common::metric_names as names;
use heartbeat_common::snapshot::HealthSnapshot;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Critical,
}

impl Default for Severity {
    fn default() -> Self {
        Self::Critical
    }
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub metric: String,
    pub value: f64,
    pub limit: f64,
    pub severity: Severity,
    pub message: String,
}

impl Violation {
    /// Relative distance past the limit, used to rank competing violations.
    pub fn magnitude(&self) -> f64 {
        if self.limit == 0.0 {
            return self.value.abs();
        }
        (self.value - self.limit).abs() / self.limit.abs()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ThresholdRule {
    pub limit: f64,
    #[serde(default)]
    pub severity: Severity,
}

impl ThresholdRule {
    const fn critical(limit: f64) -> Self {
        Self {
            limit,
            severity: Severity::Critical,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ThresholdConfig {
    #[serde(default = "default_min_buffer_health")]
    pub min_buffer_health: ThresholdRule,
    #[serde(default = "default_min_fps")]
    pub min_fps: ThresholdRule,
    #[serde(default = "default_min_bitrate")]
    pub min_bitrate: ThresholdRule,
    #[serde(default = "default_max_issue_count")]
    pub max_issue_count: ThresholdRule,
    #[serde(default = "default_max_packet_loss")]
    pub max_packet_loss: ThresholdRule,
}

fn default_min_buffer_health() -> ThresholdRule {
    ThresholdRule::critical(1.5)
}

fn default_min_fps() -> ThresholdRule {
    ThresholdRule::critical(24.0)
}

fn default_min_bitrate() -> ThresholdRule {
    ThresholdRule::critical(800_000.0)
}

fn default_max_issue_count() -> ThresholdRule {
    ThresholdRule::critical(1.0)
}

fn default_max_packet_loss() -> ThresholdRule {
    ThresholdRule::critical(0.02)
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            min_buffer_health: default_min_buffer_health(),
            min_fps: default_min_fps(),
            min_bitrate: default_min_bitrate(),
            max_issue_count: default_max_issue_count(),
            max_packet_loss: default_max_packet_loss(),
        }
    }
}

/// Static, stateless limits checked against every snapshot.
#[derive(Debug, Clone, Default)]
pub struct ThresholdEvaluator {
    config: ThresholdConfig,
}

impl ThresholdEvaluator {
    pub fn new(config: ThresholdConfig) -> Self {
        Self { config }
    }

    pub fn check(&self, snapshot: &HealthSnapshot) -> Vec<Violation> {
        if snapshot.active_streams == 0 {
            return Vec::new();
        }
        let c = &self.config;
        let h = &snapshot.health;
        let mut out = Vec::new();

        // Zero readings mean "not reported" for these gauges.
        if h.avg_buffer_health > 0.0 && h.avg_buffer_health < c.min_buffer_health.limit {
            out.push(violation(
                names::AVG_BUFFER_HEALTH,
                h.avg_buffer_health,
                c.min_buffer_health,
                format!(
                    "buffer health {:.2} < {:.2}",
                    h.avg_buffer_health, c.min_buffer_health.limit
                ),
            ));
        }
        if h.avg_fps > 0.0 && h.avg_fps < c.min_fps.limit {
            out.push(violation(
                names::AVG_FPS,
                h.avg_fps,
                c.min_fps,
                format!("avg FPS {:.2} < {:.2}", h.avg_fps, c.min_fps.limit),
            ));
        }
        if h.avg_bitrate > 0.0 && h.avg_bitrate < c.min_bitrate.limit {
            out.push(violation(
                names::AVG_BITRATE,
                h.avg_bitrate,
                c.min_bitrate,
                format!("avg bitrate {:.2} < {:.2}", h.avg_bitrate, c.min_bitrate.limit),
            ));
        }
        let issues = h.total_issue_count as f64;
        if issues >= c.max_issue_count.limit {
            out.push(violation(
                names::TOTAL_ISSUE_COUNT,
                issues,
                c.max_issue_count,
                format!("issue count {} >= {}", h.total_issue_count, c.max_issue_count.limit),
            ));
        }
        if let Some(q) = &snapshot.client_qoe {
            if q.avg_packet_loss_rate >= c.max_packet_loss.limit {
                out.push(violation(
                    names::AVG_PACKET_LOSS,
                    q.avg_packet_loss_rate,
                    c.max_packet_loss,
                    format!(
                        "packet loss {:.4} >= {:.4}",
                        q.avg_packet_loss_rate, c.max_packet_loss.limit
                    ),
                ));
            }
        }
        out
    }
}

fn violation(metric: &str, value: f64, rule: ThresholdRule, message: String) -> Violation {
    Violation {
        metric: metric.to_string(),
        value,
        limit: rule.limit,
        severity: rule.severity,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heartbeat_common::snapshot::{ClientQoeSummary, HealthSummary};
    use std::time::Duration;

    fn healthy() -> HealthSnapshot {
        HealthSnapshot {
            tenant_id: "t1".into(),
            active_streams: 2,
            window: Duration::from_secs(900),
            health: HealthSummary {
                avg_bitrate: 3_000_000.0,
                avg_fps: 30.0,
                avg_buffer_health: 3.0,
                ..Default::default()
            },
            client_qoe: None,
        }
    }

    #[test]
    fn healthy_snapshot_has_no_violations() {
        let eval = ThresholdEvaluator::default();
        assert!(eval.check(&healthy()).is_empty());
    }

    #[test]
    fn low_fps_and_issues_flagged() {
        let mut s = healthy();
        s.health.avg_fps = 12.0;
        s.health.total_issue_count = 3;
        let v = ThresholdEvaluator::default().check(&s);
        assert_eq!(v.len(), 2);
        assert_eq!(v[0].metric, "avg_fps");
        assert_eq!(v[0].message, "avg FPS 12.00 < 24.00");
        assert_eq!(v[1].metric, "total_issue_count");
        assert_eq!(v[1].severity, Severity::Critical);
    }

    #[test]
    fn zero_gauges_are_not_violations() {
        let mut s = healthy();
        s.health.avg_fps = 0.0;
        s.health.avg_bitrate = 0.0;
        s.health.avg_buffer_health = 0.0;
        assert!(ThresholdEvaluator::default().check(&s).is_empty());
    }

    #[test]
    fn no_active_streams_skips_checks() {
        let mut s = healthy();
        s.active_streams = 0;
        s.health.total_issue_count = 10;
        assert!(ThresholdEvaluator::default().check(&s).is_empty());
    }

    #[test]
    fn packet_loss_requires_qoe() {
        let mut s = healthy();
        s.client_qoe = Some(ClientQoeSummary {
            avg_packet_loss_rate: 0.05,
            ..Default::default()
        });
        let v = ThresholdEvaluator::default().check(&s);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].metric, "avg_packet_loss");
    }

    #[test]
    fn config_overrides_severity() {
        let cfg = ThresholdConfig {
            max_issue_count: ThresholdRule {
                limit: 5.0,
                severity: Severity::Warning,
            },
            ..Default::default()
        };
        assert_eq!(cfg.min_fps, default_min_fps());

        let mut s = healthy();
        s.health.total_issue_count = 4;
        assert!(ThresholdEvaluator::new(cfg.clone()).check(&s).is_empty());

        s.health.total_issue_count = 5;
        let v = ThresholdEvaluator::new(cfg).check(&s);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].severity, Severity::Warning);
    }

    #[test]
    fn magnitude_is_relative_breach() {
        let v = Violation {
            metric: "avg_fps".into(),
            value: 12.0,
            limit: 24.0,
            severity: Severity::Critical,
            message: String::new(),
        };
        assert!((v.magnitude() - 0.5).abs() < 1e-9);
    }
}
