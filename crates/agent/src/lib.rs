pub mod api;
pub mod cli;
pub mod clients;
pub mod config;
pub mod infra;
pub mod investigate;
pub mod lookout;
pub mod messaging;
pub mod metrics;
pub mod observer;
pub mod reporter;
pub mod run;
pub mod scheduler;
pub mod shutdown;
pub mod storage;
pub mod usage;
