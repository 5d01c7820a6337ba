use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;

use super::state::AgentState;
use crate::metrics::render_prometheus;

const PROMETHEUS_TEXT: &str = "text/plain; version=0.0.4; charset=utf-8";

pub async fn metrics(State(state): State<AgentState>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, PROMETHEUS_TEXT)], render_prometheus(state.metrics()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn exposes_cycle_and_flag_counters() {
        let state = AgentState::default();
        state.metrics().inc_flags();
        state.metrics().inc_flags_suppressed();
        let resp = metrics(State(state)).await.into_response();
        assert_eq!(resp.headers()[header::CONTENT_TYPE], PROMETHEUS_TEXT);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("heartbeat_flags_total 1"));
        assert!(text.contains("heartbeat_flags_suppressed_total 1"));
        assert!(text.contains("# TYPE heartbeat_cycle_latency_us summary"));
    }
}
