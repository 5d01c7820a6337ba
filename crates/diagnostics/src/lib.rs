pub mod baseline;
pub mod cooldown;
pub mod correlator;
pub mod deviation;
pub mod per_stream;
pub mod threshold;
pub mod triage;

pub use baseline::{
    Baseline, BaselineError, BaselineEvaluator, BaselineStore, InMemoryBaselineStore,
    PgBaselineStore,
};
pub use cooldown::Cooldown;
pub use correlator::{correlate, Correlation, Pattern};
pub use deviation::{Deviation, Direction};
pub use per_stream::{PerStreamAnalyzer, StreamAnomaly, StreamMetricsSource};
pub use threshold::{Severity, ThresholdConfig, ThresholdEvaluator, ThresholdRule, Violation};
pub use triage::{triage, TriageAction, TriagePolicy, TriageResult};
