mod evaluator;
mod memory;
mod model;
mod pg;
mod store;

pub use evaluator::{BaselineEvaluator, DEFAULT_MIN_SAMPLES, DEFAULT_SIGMA_LIMIT};
pub use memory::InMemoryBaselineStore;
pub use model::Baseline;
pub use pg::PgBaselineStore;
pub use store::{BaselineError, BaselineMap, BaselineStore};
