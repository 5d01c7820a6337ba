pub mod migrator;
mod pool;

pub use pool::{create_pool, open_database};
