/// Storage-specific errors
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database connection error
    #[error("Database connection error: {0}")]
    Connection(String),

    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Smart playlist rule that cannot be compiled to SQL
    #[error("Invalid smart playlist rule: {0}")]
    InvalidRule(String),

    /// Database error from `SQLx`
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StorageError {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

impl From<StorageError> for soul_core::SoulError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { entity, id } => soul_core::SoulError::NotFound { entity, id },
            StorageError::InvalidRule(msg) => soul_core::SoulError::InvalidInput(msg),
            other => soul_core::SoulError::storage(other.to_string()),
        }
    }
}
