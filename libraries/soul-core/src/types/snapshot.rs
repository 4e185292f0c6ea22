/// Durable queue snapshot
use crate::types::{PlaybackContext, SortSpec, TrackId};
use serde::{Deserialize, Serialize};

/// Ordering mode of a queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueMode {
    #[default]
    Shuffle,
    Sorted,
}

impl QueueMode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shuffle => "shuffle",
            Self::Sorted => "sorted",
        }
    }
}

impl std::fmt::Display for QueueMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Persisted form of a queue: one record per active session
///
/// Deliberately carries no playing/paused flag; a restored queue always
/// starts paused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSnapshot {
    pub context: PlaybackContext,
    pub track_ids: Vec<TrackId>,
    pub cursor: usize,
    pub mode: QueueMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_spec: Option<SortSpec>,
}
