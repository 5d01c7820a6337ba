use serde::Deserialize;

/// Incident published by the lookout service.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct LookoutIncident {
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub severity: String,
}

impl LookoutIncident {
    pub fn decode(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }

    /// Trimmed summary, or the severity when no summary was given.
    pub fn reason(&self) -> String {
        let summary = self.summary.trim();
        if summary.is_empty() {
            format!("Lookout incident severity={}", self.severity)
        } else {
            summary.to_string()
        }
    }
}
