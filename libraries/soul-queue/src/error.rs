//! Error types for queue management

use thiserror::Error;

/// Queue errors
///
/// Empty contexts and exhausted candidate pools are *not* errors; they surface
/// as empty windows, `None` picks and [`crate::Advance::Exhausted`].
#[derive(Debug, Error)]
pub enum QueueError {
    /// Context is missing required identity fields
    #[error("Invalid playback context: {0}")]
    InvalidContext(String),

    /// Operation needs a queue but none has been started or restored
    #[error("No active queue")]
    NoActiveQueue,

    /// Snapshot violates queue invariants
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// Collaborator (resolver or metadata store) failure
    #[error("Store error: {0}")]
    Store(#[from] soul_core::SoulError),

    /// A previous holder of the session lock panicked
    #[error("Queue state lock poisoned")]
    StatePoisoned,
}

/// Result type for queue operations
pub type Result<T> = std::result::Result<T, QueueError>;
