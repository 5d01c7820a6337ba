use std::collections::{HashMap, HashSet};

use heartbeat_common::metric_names as names;

use crate::deviation::{Deviation, Direction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Pattern {
    NetworkDegradation,
    EncoderOverload,
    ViewerSideIssues,
    IngestInstability,
    CdnPressure,
}

impl Pattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkDegradation => "network_degradation",
            Self::EncoderOverload => "encoder_overload",
            Self::ViewerSideIssues => "viewer_side_issues",
            Self::IngestInstability => "ingest_instability",
            Self::CdnPressure => "cdn_pressure",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::NetworkDegradation => "Network degradation",
            Self::EncoderOverload => "Encoder overload",
            Self::ViewerSideIssues => "Viewer side issues",
            Self::IngestInstability => "Ingest instability",
            Self::CdnPressure => "Cdn pressure",
        }
    }
}

/// A failure hypothesis backed by co-occurring deviations.
#[derive(Debug, Clone, PartialEq)]
pub struct Correlation {
    pub pattern: Pattern,
    pub hypothesis: String,
    pub confidence: f64,
    pub deviations: Vec<Deviation>,
}

struct Rule {
    pattern: Pattern,
    signals: &'static [(&'static str, Direction)],
    /// Alternatives for one extra signal; the first present one counts.
    flexible: &'static [(&'static str, Direction)],
    /// Metrics whose absence from the deviation set strengthens the hypothesis.
    absence_boost: &'static [&'static str],
}

impl Rule {
    fn total_signals(&self) -> usize {
        self.signals.len() + usize::from(!self.flexible.is_empty())
    }
}

const RULES: &[Rule] = &[
    Rule {
        pattern: Pattern::NetworkDegradation,
        signals: &[
            (names::AVG_PACKET_LOSS, Direction::Above),
            (names::AVG_BANDWIDTH_IN, Direction::Below),
            (names::AVG_BUFFER_HEALTH, Direction::Below),
        ],
        flexible: &[],
        absence_boost: &[],
    },
    Rule {
        pattern: Pattern::EncoderOverload,
        signals: &[
            (names::AVG_FPS, Direction::Below),
            (names::AVG_BITRATE, Direction::Below),
        ],
        flexible: &[],
        absence_boost: &[names::AVG_PACKET_LOSS],
    },
    Rule {
        pattern: Pattern::ViewerSideIssues,
        signals: &[
            (names::AVG_BUFFER_HEALTH, Direction::Below),
            (names::TOTAL_REBUFFER_COUNT, Direction::Above),
        ],
        flexible: &[],
        absence_boost: &[names::AVG_BANDWIDTH_OUT],
    },
    Rule {
        pattern: Pattern::IngestInstability,
        signals: &[
            (names::AVG_BITRATE, Direction::Below),
            (names::AVG_FPS, Direction::Below),
            (names::TOTAL_ISSUE_COUNT, Direction::Above),
        ],
        flexible: &[],
        absence_boost: &[],
    },
    Rule {
        pattern: Pattern::CdnPressure,
        signals: &[
            (names::AVG_BANDWIDTH_OUT, Direction::Above),
            (names::TOTAL_ACTIVE_SESSIONS, Direction::Above),
        ],
        flexible: &[
            (names::TOTAL_REBUFFER_COUNT, Direction::Above),
            (names::AVG_BUFFER_HEALTH, Direction::Below),
        ],
        absence_boost: &[],
    },
];

const MIN_MATCHED: usize = 2;
const COVERAGE_WEIGHT: f64 = 0.8;
const MAGNITUDE_WEIGHT: f64 = 0.2;
const MAGNITUDE_SATURATION_SIGMA: f64 = 10.0;
const ABSENCE_BOOST: f64 = 0.1;

/// Matches deviations against the fixed rule table.
///
/// Output is sorted by confidence descending, then pattern name.
pub fn correlate(deviations: &[Deviation]) -> Vec<Correlation> {
    if deviations.is_empty() {
        return Vec::new();
    }

    let mut by_signal: HashMap<(&str, Direction), &Deviation> = HashMap::new();
    for d in deviations {
        let slot = by_signal.entry((d.metric.as_str(), d.direction)).or_insert(d);
        if d.sigma > slot.sigma {
            *slot = d;
        }
    }
    let deviated: HashSet<&str> = deviations.iter().map(|d| d.metric.as_str()).collect();

    let mut out = Vec::new();
    for rule in RULES {
        let mut matched: Vec<&Deviation> = rule
            .signals
            .iter()
            .filter_map(|(m, dir)| by_signal.get(&(*m, *dir)).copied())
            .collect();

        if matched.len() >= MIN_MATCHED {
            if let Some(d) = rule
                .flexible
                .iter()
                .find_map(|(m, dir)| by_signal.get(&(*m, *dir)).copied())
            {
                matched.push(d);
            }
        }
        if matched.len() < MIN_MATCHED {
            continue;
        }

        let coverage = matched.len() as f64 / rule.total_signals() as f64;
        let mean_sigma = matched.iter().map(|d| d.sigma).sum::<f64>() / matched.len() as f64;
        let mut confidence = COVERAGE_WEIGHT * coverage
            + MAGNITUDE_WEIGHT * (mean_sigma / MAGNITUDE_SATURATION_SIGMA).min(1.0);
        for absent in rule.absence_boost {
            if !deviated.contains(absent) {
                confidence += ABSENCE_BOOST;
            }
        }

        out.push(Correlation {
            pattern: rule.pattern,
            hypothesis: hypothesis(rule.pattern, &matched),
            confidence: confidence.min(1.0),
            deviations: matched.into_iter().cloned().collect(),
        });
    }

    out.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then_with(|| a.pattern.as_str().cmp(b.pattern.as_str()))
    });
    out
}

fn hypothesis(pattern: Pattern, devs: &[&Deviation]) -> String {
    let parts: Vec<String> = devs
        .iter()
        .map(|d| format!("{} {:.1}σ {} baseline", d.metric, d.sigma, d.direction))
        .collect();
    format!("{}: {}", pattern.label(), parts.join(", "))
}
