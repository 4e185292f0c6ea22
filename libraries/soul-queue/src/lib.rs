//! Soul Player - Rolling-Window Queue
//!
//! Decides which track plays next for a listening session.
//!
//! This crate provides:
//! - Window initialization (shuffle sample or sorted prefix of a context)
//! - Incremental sampling of one replacement track
//! - Window rebuilds that keep history and the current track in place
//! - A lookahead refill controller with a single-writer session state
//! - Best-effort snapshot persistence and paused restore
//!
//! # Architecture
//!
//! `soul-queue` never talks to a database directly. Track membership and
//! metadata come from a [`soul_core::storage::TrackMetadataStore`] and
//! snapshots go to a [`soul_core::storage::QueueStateStore`]; `soul-storage`
//! provides SQLite implementations of both.
//!
//! The window, sampler and rebuild steps are pure functions over resolved
//! candidates (`select_window`, `pick_next`, `rebuild_window`). Their async
//! counterparts resolve the context first.
//!
//! # Example
//!
//! ```rust,no_run
//! use soul_core::storage::{QueueStateStore, TrackMetadataStore};
//! use soul_core::types::PlaybackContext;
//! use soul_queue::{QueueConfig, QueueSession, StatePersister};
//! use std::sync::Arc;
//!
//! # async fn example(
//! #     library: Arc<dyn TrackMetadataStore>,
//! #     state_store: Arc<dyn QueueStateStore>,
//! # ) -> soul_queue::Result<()> {
//! let session = QueueSession::new(
//!     library,
//!     StatePersister::new(state_store),
//!     QueueConfig::default(),
//! );
//!
//! // Pick up where the last process left off (paused)
//! session.restore().await?;
//!
//! session.play(PlaybackContext::playlist("road-trip").shuffled()).await?;
//! session.advance().await?;
//! session.toggle_shuffle().await?;
//! # Ok(())
//! # }
//! ```

mod error;
pub mod events;
mod persist;
mod queue;
mod rebuild;
mod resolver;
mod sampler;
pub mod sampling;
mod session;
pub mod types;
mod window;

// Public exports
pub use error::{QueueError, Result};
pub use events::QueueEvent;
pub use persist::StatePersister;
pub use queue::Queue;
pub use rebuild::{rebuild_queue, rebuild_window};
pub use resolver::resolve_candidates;
pub use sampler::{get_next_track, pick_after, pick_next};
pub use session::{QueueSession, QueueView, RestoredQueue};
pub use types::{
    Advance, QueueConfig, QueueOrder, QueuePhase, DEFAULT_LOOKAHEAD_THRESHOLD,
    DEFAULT_WINDOW_SIZE,
};
pub use window::{build_queue, initialize_queue, select_window};
