use std::sync::Arc;

use heartbeat_common::report::Report;
use heartbeat_common::snapshot::HealthSnapshot;
use heartbeat_diagnostics::{StreamAnomaly, TriageResult};

use super::parse::parse_report;
use super::prompt::build_prompt;
use crate::clients::{ChatMessage, ClientError, Reasoner, TokenCounts};

pub const SYSTEM_PROMPT: &str = r#"You are the heartbeat diagnostic agent for a live-video platform.
Investigate the signals below, then produce a report in JSON with:
{
  "summary": "short summary",
  "metrics_reviewed": ["metric1", "metric2"],
  "root_cause": "suspected root cause",
  "recommendations": [
    {"text": "recommendation", "confidence": "high|medium|low"}
  ]
}
Respond with the JSON object only."#;

#[derive(Debug, Clone, PartialEq)]
pub struct Investigation {
    pub report: Report,
    pub tokens: TokenCounts,
}

pub struct Investigator {
    reasoner: Arc<dyn Reasoner>,
}

impl Investigator {
    pub fn new(reasoner: Arc<dyn Reasoner>) -> Self {
        Self { reasoner }
    }

    pub async fn investigate(
        &self,
        snapshot: &HealthSnapshot,
        triage: &TriageResult,
        anomalies: &[StreamAnomaly],
    ) -> Result<Investigation, ClientError> {
        let messages = [
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(build_prompt(snapshot, triage, anomalies)),
        ];
        let reasoning = self.reasoner.run(&messages).await?;
        Ok(Investigation {
            report: parse_report(&reasoning.content, &triage.trigger),
            tokens: reasoning.tokens,
        })
    }
}
