use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub confidence: String,
}

/// Outcome of one investigation, or the stub produced for a flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub trigger: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub metrics_reviewed: Vec<String>,
    #[serde(default)]
    pub root_cause: String,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
}

impl Report {
    pub fn format_markdown(&self) -> String {
        let mut lines = vec!["## Investigation Report".to_string()];
        if !self.summary.trim().is_empty() {
            lines.push(format!("**Summary:** {}", self.summary));
        }
        if !self.metrics_reviewed.is_empty() {
            lines.push("\n**Metrics Reviewed:**".into());
            for metric in &self.metrics_reviewed {
                lines.push(format!("- {metric}"));
            }
        }
        if !self.root_cause.trim().is_empty() {
            lines.push(format!("\n**Root Cause:** {}", self.root_cause));
        }
        if !self.recommendations.is_empty() {
            lines.push("\n**Recommendations:**".into());
            for rec in &self.recommendations {
                let confidence = match rec.confidence.trim() {
                    "" => "unknown",
                    c => c,
                };
                lines.push(format!("- [{confidence}] {}", rec.text));
            }
        }
        lines.join("\n")
    }
}
