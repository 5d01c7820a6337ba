use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use super::state::AgentState;

#[derive(Debug, Serialize)]
pub struct LivenessBody {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ReadinessBody {
    pub ready: bool,
    pub cycles: u64,
    pub cycle_panics: u64,
}

pub async fn healthz() -> Json<LivenessBody> {
    Json(LivenessBody {
        status: "ok",
        service: "heartbeat-agent",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// 503 until the first heartbeat cycle has finished, panicked or not.
pub async fn ready(State(state): State<AgentState>) -> (StatusCode, Json<ReadinessBody>) {
    let m = state.metrics();
    let body = ReadinessBody {
        ready: state.is_ready(),
        cycles: m.cycles_val(),
        cycle_panics: m.cycle_panics_val(),
    };
    let code = if body.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(body))
}
