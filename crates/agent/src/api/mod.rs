//! Liveness, readiness and Prometheus endpoints for the heartbeat loop.

mod health;
mod metrics;
mod server;
mod state;

pub use health::{healthz, ready, LivenessBody, ReadinessBody};
pub use server::{router, serve, spawn};
pub use state::AgentState;
