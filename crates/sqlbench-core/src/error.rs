//! Error types for sqlbench

use thiserror::Error;

/// Core error type for boundary operations
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Query cancelled")]
    Cancelled,
}

/// Result type alias for sqlbench operations
pub type Result<T> = std::result::Result<T, BenchError>;
