//! Core types for queue management

use serde::{Deserialize, Serialize};
use soul_core::types::{PlaybackContext, QueueMode, SortSpec, TrackId};

/// Default number of tracks a freshly built window holds
pub const DEFAULT_WINDOW_SIZE: usize = 100;

/// Default minimum number of buffered tracks before a refill is triggered
pub const DEFAULT_LOOKAHEAD_THRESHOLD: usize = 50;

/// Ordering of a queue
///
/// Shuffle carries no parameters; sorted always carries a validated spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "sortSpec", rename_all = "lowercase")]
pub enum QueueOrder {
    Shuffle,
    Sorted(SortSpec),
}

impl QueueOrder {
    /// Ordering requested by a context when it is started
    ///
    /// A non-shuffled context without a spec sorts by track number.
    pub fn for_context(context: &PlaybackContext) -> Self {
        if context.shuffle {
            Self::Shuffle
        } else {
            Self::Sorted(context.sort_spec.unwrap_or_default())
        }
    }

    /// Rebuild from the persisted mode/spec pair
    pub fn from_parts(mode: QueueMode, sort_spec: Option<SortSpec>) -> Self {
        match mode {
            QueueMode::Shuffle => Self::Shuffle,
            QueueMode::Sorted => Self::Sorted(sort_spec.unwrap_or_default()),
        }
    }

    pub fn mode(&self) -> QueueMode {
        match self {
            Self::Shuffle => QueueMode::Shuffle,
            Self::Sorted(_) => QueueMode::Sorted,
        }
    }

    pub fn sort_spec(&self) -> Option<SortSpec> {
        match self {
            Self::Shuffle => None,
            Self::Sorted(spec) => Some(*spec),
        }
    }

    pub fn is_shuffle(&self) -> bool {
        matches!(self, Self::Shuffle)
    }
}

impl std::fmt::Display for QueueOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Shuffle => write!(f, "shuffle"),
            Self::Sorted(spec) => write!(f, "sorted by {}", spec),
        }
    }
}

/// Refill controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueuePhase {
    /// No queue has been started or restored
    Empty,

    /// Queue built or restored, playback paused
    Initialized,

    /// Queue active and playing
    Playing,

    /// Future suffix being regenerated after an ordering change
    Rebuilding,

    /// Cursor ran past the last queued track
    Exhausted,
}

/// Outcome of an advance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Cursor moved onto this track
    Track(TrackId),

    /// No unplayed track remains
    Exhausted,
}

/// Configuration for queue sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Maximum length of a freshly built or rebuilt window (default: 100)
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Refill when fewer tracks than this remain ahead (default: 50)
    #[serde(default = "default_lookahead_threshold")]
    pub lookahead_threshold: usize,
}

fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}

fn default_lookahead_threshold() -> usize {
    DEFAULT_LOOKAHEAD_THRESHOLD
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            lookahead_threshold: DEFAULT_LOOKAHEAD_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soul_core::types::SortField;

    #[test]
    fn default_config() {
        let config = QueueConfig::default();
        assert_eq!(config.window_size, 100);
        assert_eq!(config.lookahead_threshold, 50);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: QueueConfig = serde_json::from_str(r#"{"window_size": 20}"#).unwrap();
        assert_eq!(config.window_size, 20);
        assert_eq!(config.lookahead_threshold, 50);
    }

    #[test]
    fn unsorted_context_defaults_to_track_number() {
        let context = PlaybackContext::playlist("p1");
        assert_eq!(
            QueueOrder::for_context(&context),
            QueueOrder::Sorted(SortSpec::asc(SortField::TrackNumber))
        );
        assert_eq!(
            QueueOrder::for_context(&context.shuffled()),
            QueueOrder::Shuffle
        );
    }

    #[test]
    fn order_round_trips_through_parts() {
        let order = QueueOrder::Sorted(SortSpec::desc(SortField::EloRating));
        assert_eq!(QueueOrder::from_parts(order.mode(), order.sort_spec()), order);
        assert_eq!(
            QueueOrder::from_parts(QueueMode::Shuffle, None),
            QueueOrder::Shuffle
        );
    }
}
