pub const STREAM_NAME: &str = "HEARTBEAT_EVENTS";
pub const REPORT_SUBJECT_PREFIX: &str = "heartbeat.reports";
pub const USAGE_SUBJECT_PREFIX: &str = "heartbeat.usage";
pub const SOURCE_TAG: &str = "heartbeat";

pub const LOOKOUT_STREAM_NAME: &str = "LOOKOUT_INCIDENTS";
pub const LOOKOUT_SUBJECT: &str = "lookout.incidents";
pub const LOOKOUT_CONSUMER_NAME: &str = "heartbeat-lookout";

pub fn report_subject(tenant_id: &str) -> String {
    format!("{REPORT_SUBJECT_PREFIX}.{tenant_id}")
}

pub fn usage_subject(tenant_id: &str) -> String {
    format!("{USAGE_SUBJECT_PREFIX}.{tenant_id}")
}

#[derive(Debug, Clone)]
pub struct StreamConfig {
    pub name: String,
    pub subjects: Vec<String>,
    pub max_bytes: i64,
    pub max_age_secs: u64,
    pub num_replicas: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            name: STREAM_NAME.into(),
            subjects: vec![
                format!("{REPORT_SUBJECT_PREFIX}.>"),
                format!("{USAGE_SUBJECT_PREFIX}.>"),
            ],
            max_bytes: 256 * 1024 * 1024,
            max_age_secs: 86400 * 3,
            num_replicas: 1,
        }
    }
}

impl StreamConfig {
    /// Stream carrying incidents raised by the lookout service.
    pub fn lookout(name: &str, subject: &str) -> Self {
        Self {
            name: name.to_string(),
            subjects: vec![subject.to_string()],
            max_bytes: 64 * 1024 * 1024,
            max_age_secs: 86400,
            num_replicas: 1,
        }
    }
}
