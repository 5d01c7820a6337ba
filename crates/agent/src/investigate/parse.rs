use heartbeat_common::report::Report;

pub const FALLBACK_ROOT_CAUSE: &str = "unknown";

/// Returns the first balanced `{...}` span, ignoring braces inside string literals.
pub fn extract_json_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in content[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&content[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Decodes the reasoner output into a report. Never fails: unusable output
/// becomes a report whose summary is the raw text.
pub fn parse_report(content: &str, trigger: &str) -> Report {
    let decoded = extract_json_object(content)
        .and_then(|raw| serde_json::from_str::<Report>(raw).ok());

    let mut report = match decoded {
        Some(report) => report,
        None => {
            tracing::debug!(len = content.len(), "reasoner output is not a report, using fallback");
            Report {
                trigger: String::new(),
                summary: content.to_string(),
                metrics_reviewed: Vec::new(),
                root_cause: FALLBACK_ROOT_CAUSE.to_string(),
                recommendations: Vec::new(),
            }
        }
    };
    report.trigger = trigger.to_string();
    report
}
