pub mod fields;
pub mod mapper;
pub mod blocks;
pub mod classify;
pub mod store;
pub mod aggregate;
pub mod orchestrator;

use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed input document: {0}")]
    MalformedInput(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Phase {phase} failed: {reason}")]
    PhaseFailed { phase: &'static str, reason: String },
}

impl From<rusqlite::Error> for PipelineError {
    fn from(err: rusqlite::Error) -> Self {
        PipelineError::Database(DatabaseError::Sqlite(err))
    }
}
