use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use super::incident::LookoutIncident;
use crate::scheduler::{panic_message, Agent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncidentOutcome {
    Malformed,
    NoTenant,
    Ineligible,
    Investigated { report_id: String },
    Failed(String),
    Panicked,
}

/// Turns lookout incidents into on-demand investigations.
pub struct LookoutTrigger {
    agent: Arc<Agent>,
}

impl LookoutTrigger {
    pub fn new(agent: Arc<Agent>) -> Self {
        Self { agent }
    }

    /// Handles one incident payload. Never panics and never returns an error;
    /// every outcome is final for the message.
    pub async fn handle(&self, payload: &[u8]) -> IncidentOutcome {
        match AssertUnwindSafe(self.process(payload)).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(panic) => {
                let msg = panic_message(&*panic);
                tracing::error!(panic = %msg, "lookout trigger panicked");
                IncidentOutcome::Panicked
            }
        }
    }

    async fn process(&self, payload: &[u8]) -> IncidentOutcome {
        let incident = match LookoutIncident::decode(payload) {
            Ok(incident) => incident,
            Err(e) => {
                tracing::warn!(error = %e, "malformed lookout incident");
                return IncidentOutcome::Malformed;
            }
        };
        let tenant_id = incident.tenant_id.trim();
        if tenant_id.is_empty() {
            tracing::debug!(severity = %incident.severity, "lookout incident without tenant");
            return IncidentOutcome::NoTenant;
        }
        self.agent.state().metrics().inc_lookout_incidents();

        let reason = incident.reason();
        match self.agent.investigate_incident(tenant_id, &reason).await {
            Ok(Some(report_id)) => {
                tracing::info!(
                    tenant_id = %tenant_id,
                    severity = %incident.severity,
                    report_id = %report_id,
                    "lookout investigation delivered"
                );
                IncidentOutcome::Investigated { report_id }
            }
            Ok(None) => {
                tracing::debug!(tenant_id = %tenant_id, "tenant below required tier, lookout incident skipped");
                IncidentOutcome::Ineligible
            }
            Err(e) => {
                tracing::warn!(
                    tenant_id = %tenant_id,
                    stage = e.stage(),
                    error = %e,
                    "lookout investigation failed"
                );
                IncidentOutcome::Failed(e.to_string())
            }
        }
    }
}
