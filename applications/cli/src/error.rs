/// CLI error types
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Queue error: {0}")]
    Queue(#[from] soul_queue::QueueError),

    #[error("Database error: {0}")]
    Database(#[from] soul_core::SoulError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<soul_storage::StorageError> for CliError {
    fn from(err: soul_storage::StorageError) -> Self {
        // Convert StorageError -> SoulError -> CliError
        CliError::Database(err.into())
    }
}
