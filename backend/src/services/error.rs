//! Errors surfaced by the analysis services.

use crate::algorithms::WindowError;
use crate::db::RepositoryError;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// No valid window for the requested date. Never retried.
    #[error(transparent)]
    Window(#[from] WindowError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The blocking analysis task panicked or was cancelled.
    #[error("Analysis task failed: {0}")]
    Task(String),
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Chunk size must be at least 1")]
    InvalidChunkSize,

    #[error("Channel capacity must be at least 1")]
    InvalidChannelCapacity,

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Batch worker failed: {0}")]
    Worker(String),
}
