//! Soul Queue Storage
//!
//! `SQLite` database layer behind the rolling-window queue.
//!
//! This crate stores the track library the queue samples from and the single
//! persisted queue snapshot, and implements both collaborator traits of
//! `soul-core` on [`LocalStorageContext`].
//!
//! # Architecture
//!
//! - **Vertical Slicing**: Each feature owns its own queries and logic
//! - **Bound parameters only**: ids, exclusion lists and rule values are never
//!   interpolated into SQL
//! - **Live contexts**: smart playlists are evaluated on every resolve
//!
//! # Example
//!
//! ```rust,no_run
//! use soul_storage::{LocalStorageContext, create_pool, run_migrations};
//! use soul_core::storage::TrackMetadataStore;
//! use soul_core::types::PlaybackContext;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://soul-queue.db").await?;
//! run_migrations(&pool).await?;
//!
//! let storage = LocalStorageContext::new(pool);
//! let ids = storage
//!     .resolve_context(&PlaybackContext::playlist("road-trip"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod context;
mod error;

// Vertical slices
pub mod builder_sessions;
pub mod playlists;
pub mod queue_state;
pub mod smart_playlists;
pub mod tracks;

pub use context::LocalStorageContext;
pub use error::StorageError;

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// Call once at startup, before the first query.
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), StorageError> {
    MIGRATOR.run(pool).await?;
    tracing::debug!("Database migrations applied");
    Ok(())
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `<sqlite://soul-queue.db>`)
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, StorageError> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    tracing::debug!("Creating pool with URL: {}", database_url);

    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| StorageError::Connection(e.to_string()))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    tracing::info!("Opened database {}", database_url);

    Ok(pool)
}
