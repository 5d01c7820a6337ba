use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use super::health::{healthz, ready};
use super::metrics::metrics;
use super::state::AgentState;

pub fn router(state: AgentState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/ready", get(ready))
        .route("/metrics", get(metrics))
        .with_state(state)
}

pub async fn serve(listener: TcpListener, state: AgentState) -> std::io::Result<()> {
    axum::serve(listener, router(state)).await
}

/// Binds `addr` in the background; a failed bind is logged and the agent keeps running.
pub fn spawn(addr: String, state: AgentState) -> JoinHandle<()> {
    tokio::spawn(async move {
        let listener = match TcpListener::bind(&addr).await {
            Ok(l) => l,
            Err(e) => {
                tracing::error!(addr = %addr, error = %e, "heartbeat API bind failed");
                return;
            }
        };
        tracing::info!(addr = %addr, "heartbeat API listening");
        if let Err(e) = serve(listener, state).await {
            tracing::error!(error = %e, "heartbeat API stopped");
        }
    })
}
