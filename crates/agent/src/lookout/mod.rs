mod consumer;
mod incident;
mod trigger;

pub use consumer::{consumer_settings, create_lookout_consumer, LookoutConsumer};
pub use incident::LookoutIncident;
pub use trigger::{IncidentOutcome, LookoutTrigger};
