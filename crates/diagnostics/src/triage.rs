use std::cmp::Ordering;
use std::fmt;

use heartbeat_common::metric_names;
use serde::Deserialize;

use crate::correlator::Correlation;
use crate::deviation::Deviation;
use crate::threshold::{Severity, Violation};

pub const TRIGGER_THRESHOLD: &str = "threshold";
pub const TRIGGER_CORRELATION: &str = "correlation";
pub const TRIGGER_BASELINE: &str = "baseline";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriageAction {
    Ok,
    Flag,
    Investigate,
}

impl TriageAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Flag => "flag",
            Self::Investigate => "investigate",
        }
    }
}

impl fmt::Display for TriageAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TriagePolicy {
    #[serde(default = "default_investigate_sigma")]
    pub investigate_sigma: f64,
    #[serde(default = "default_correlation_confidence")]
    pub correlation_confidence: f64,
}

fn default_investigate_sigma() -> f64 {
    4.0
}

fn default_correlation_confidence() -> f64 {
    0.5
}

impl Default for TriagePolicy {
    fn default() -> Self {
        Self {
            investigate_sigma: default_investigate_sigma(),
            correlation_confidence: default_correlation_confidence(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TriageResult {
    pub action: TriageAction,
    pub trigger: String,
    pub reason: String,
    pub violations: Vec<Violation>,
    pub deviations: Vec<Deviation>,
    pub correlations: Vec<Correlation>,
}

impl TriageResult {
    pub fn deviated_metrics(&self) -> Vec<String> {
        self.deviations.iter().map(|d| d.metric.clone()).collect()
    }
}

/// A contributing signal reduced to what trigger selection compares.
struct Candidate<'a> {
    kind_rank: u8,
    magnitude: f64,
    name: &'a str,
    trigger: &'static str,
    reason: String,
}

fn violation_candidate(v: &Violation) -> Candidate<'_> {
    Candidate {
        kind_rank: 0,
        magnitude: v.magnitude(),
        name: &v.metric,
        trigger: TRIGGER_THRESHOLD,
        reason: format!("threshold {}: {}", v.severity, v.message),
    }
}

fn correlation_candidate(c: &Correlation) -> Candidate<'_> {
    Candidate {
        kind_rank: 1,
        magnitude: c.confidence,
        name: c.pattern.as_str(),
        trigger: TRIGGER_CORRELATION,
        reason: c.hypothesis.clone(),
    }
}

fn deviation_candidate(d: &Deviation) -> Candidate<'_> {
    Candidate {
        kind_rank: 2,
        magnitude: d.sigma,
        name: &d.metric,
        trigger: TRIGGER_BASELINE,
        reason: d.to_string(),
    }
}

/// Kind priority first, then the largest magnitude, then canonical metric order.
fn compare(a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    a.kind_rank
        .cmp(&b.kind_rank)
        .then_with(|| b.magnitude.total_cmp(&a.magnitude))
        .then_with(|| metric_names::compare(a.name, b.name))
}

fn pick<'a>(candidates: Vec<Candidate<'a>>) -> Option<Candidate<'a>> {
    candidates.into_iter().min_by(compare)
}

/// Classifies a tenant's state. Pure: equal inputs give equal results.
pub fn triage(
    violations: &[Violation],
    deviations: &[Deviation],
    correlations: &[Correlation],
    policy: &TriagePolicy,
) -> TriageResult {
    let mut result = TriageResult {
        action: TriageAction::Ok,
        trigger: String::new(),
        reason: "all metrics within baseline".into(),
        violations: violations.to_vec(),
        deviations: deviations.to_vec(),
        correlations: correlations.to_vec(),
    };

    let severe: Vec<Candidate<'_>> = violations
        .iter()
        .filter(|v| v.severity == Severity::Critical)
        .map(violation_candidate)
        .chain(
            correlations
                .iter()
                .filter(|c| c.confidence >= policy.correlation_confidence)
                .map(correlation_candidate),
        )
        .chain(
            deviations
                .iter()
                .filter(|d| d.sigma >= policy.investigate_sigma)
                .map(deviation_candidate),
        )
        .collect();

    if let Some(c) = pick(severe) {
        result.action = TriageAction::Investigate;
        result.trigger = c.trigger.to_string();
        result.reason = c.reason;
        return result;
    }

    let lesser: Vec<Candidate<'_>> = violations
        .iter()
        .map(violation_candidate)
        .chain(deviations.iter().map(deviation_candidate))
        .collect();
    let count = lesser.len();

    if let Some(c) = pick(lesser) {
        result.action = TriageAction::Flag;
        result.trigger = c.trigger.to_string();
        result.reason = if count > 1 {
            format!("{count} signals outside normal range; strongest: {}", c.reason)
        } else {
            c.reason
        };
    }
    result
}
