use sqlbench_core::BenchError;
use thiserror::Error;
use uuid::Uuid;

pub type SessionResult<T> = Result<T, SessionError>;

/// Session-level errors with user-friendly messages
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Bench(#[from] BenchError),

    #[error("Tab not found: {0}")]
    TabNotFound(Uuid),

    #[error("Tab {0} is not bound to a table")]
    NoTableBound(Uuid),

    #[error("Table {0} has no primary key column")]
    NoPrimaryKey(String),

    #[error("Connection is not open: {0}")]
    ConnectionNotOpen(String),
}
