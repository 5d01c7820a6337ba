mod agent;
mod error;
mod source;

pub use agent::{
    Agent, AgentDeps, AgentSettings, CycleSummary, EligibleTenant, TenantOutcome, LOOKOUT_TRIGGER,
};
pub(crate) use agent::panic_message;
pub use error::CycleError;
pub use source::MetricsStreamSource;
