//! Queue Events
//!
//! Emitted by [`crate::QueueSession`] after each committed transition so a UI
//! layer can follow the queue without polling. Delivery uses a broadcast
//! channel; with no subscribers events are simply dropped.

use crate::types::{QueueOrder, QueuePhase};
use serde::{Deserialize, Serialize};
use soul_core::types::{PlaybackContext, TrackId};

/// Events emitted by the queue session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueueEvent {
    /// A new context replaced the queue
    QueueStarted {
        context: PlaybackContext,
        /// Tracks in the initial window
        tracks: usize,
    },

    /// Cursor moved onto a new track
    TrackChanged {
        track_id: TrackId,
        previous_track_id: Option<TrackId>,
    },

    /// One track appended by the lookahead refill
    QueueRefilled { track_id: TrackId },

    /// Future suffix regenerated for a new ordering
    QueueRebuilt { order: QueueOrder, tracks: usize },

    /// No unplayed track remains
    QueueExhausted,

    /// Persisted queue loaded at startup (always paused)
    QueueRestored { cursor: usize, tracks: usize },

    /// Controller state changed
    PhaseChanged { from: QueuePhase, to: QueuePhase },
}
