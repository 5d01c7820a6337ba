use std::cmp::Ordering;

pub const AVG_BITRATE: &str = "avg_bitrate";
pub const AVG_FPS: &str = "avg_fps";
pub const AVG_BUFFER_HEALTH: &str = "avg_buffer_health";
pub const TOTAL_REBUFFER_COUNT: &str = "total_rebuffer_count";
pub const TOTAL_ISSUE_COUNT: &str = "total_issue_count";
pub const AVG_PACKET_LOSS: &str = "avg_packet_loss";
pub const AVG_BANDWIDTH_IN: &str = "avg_bandwidth_in";
pub const AVG_BANDWIDTH_OUT: &str = "avg_bandwidth_out";
pub const TOTAL_ACTIVE_SESSIONS: &str = "total_active_sessions";

pub const NODE_CPU: &str = "node_cpu";
pub const NODE_MEMORY: &str = "node_memory";
pub const NODE_DISK: &str = "node_disk";

/// Canonical ordering used to break ties between signals of equal weight.
pub const CANONICAL_ORDER: &[&str] = &[
    AVG_BITRATE,
    AVG_FPS,
    AVG_BUFFER_HEALTH,
    TOTAL_REBUFFER_COUNT,
    TOTAL_ISSUE_COUNT,
    AVG_PACKET_LOSS,
    AVG_BANDWIDTH_IN,
    AVG_BANDWIDTH_OUT,
    TOTAL_ACTIVE_SESSIONS,
    NODE_CPU,
    NODE_MEMORY,
    NODE_DISK,
];

pub fn rank(metric: &str) -> usize {
    CANONICAL_ORDER
        .iter()
        .position(|m| *m == metric)
        .unwrap_or(CANONICAL_ORDER.len())
}

/// Orders metric names by canonical rank, then lexicographically.
pub fn compare(a: &str, b: &str) -> Ordering {
    rank(a).cmp(&rank(b)).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_metrics_precede_unknown() {
        assert_eq!(compare(AVG_BITRATE, "zzz_custom"), Ordering::Less);
        assert_eq!(compare("zzz_custom", AVG_BITRATE), Ordering::Greater);
    }

    #[test]
    fn unknown_metrics_fall_back_to_name() {
        assert_eq!(compare("a_custom", "b_custom"), Ordering::Less);
    }

    #[test]
    fn canonical_rank_is_stable() {
        assert!(rank(AVG_BITRATE) < rank(AVG_FPS));
        assert!(rank(AVG_FPS) < rank(TOTAL_ISSUE_COUNT));
    }
}
