use std::time::Duration;

use crate::filter::FilterDimension;

#[derive(Debug, thiserror::Error)]
pub enum ExplorerError {
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Cannot select {dimension}: {missing} must be selected first")]
    InvalidTransition {
        dimension: FilterDimension,
        missing: FilterDimension,
    },

    #[error("Query '{query}' timed out after {timeout:?}")]
    Timeout {
        query: String,
        timeout: Duration,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session halted after data source failure: {0}")]
    SessionHalted(String),

    #[error("Task error: {0}")]
    Task(String),
}

impl ExplorerError {
    /// Whether repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ExplorerError::Timeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, ExplorerError>;
