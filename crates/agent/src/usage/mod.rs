mod event;
mod sink;

pub use event::{UsageEvent, INVESTIGATION_OPERATION};
pub use sink::{InMemoryUsageSink, NatsUsageSink, UsageSink};
