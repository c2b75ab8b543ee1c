pub mod config;
pub mod db;
pub mod models;
pub mod pipeline;

pub use pipeline::orchestrator::{build_database, RunOutcome};
