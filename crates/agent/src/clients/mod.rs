mod billing;
mod error;
mod http;
mod metrics;
mod reasoner;
mod registry;
mod types;

pub use billing::{BillingClient, HttpBillingClient};
pub use error::ClientError;
pub use http::HttpJson;
pub use metrics::{HttpMetricsClient, MetricsClient};
pub use reasoner::{ChatMessage, OpenAiReasoner, Reasoner, Reasoning, TokenCounts};
pub use registry::{HttpTenantRegistry, TenantRegistry};
pub use types::{
    BillingStatus, Cluster, ClusterPage, FederationSummary, LiveNode, NodeOwner,
    NodePerformanceRecord, PlatformOverview, TimeRange,
};
