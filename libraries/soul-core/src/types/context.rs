//! Playback context: where the eligible tracks of a queue come from

use crate::error::{Result, SoulError};
use crate::types::SortSpec;
use serde::{Deserialize, Serialize};

/// Types of playback contexts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKind {
    /// Static playlist (membership table)
    Playlist,
    /// Rule-based playlist evaluated live on every resolve
    SmartPlaylist,
    /// Ad-hoc track selection from the playlist builder
    BuilderSession,
}

impl ContextKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextKind::Playlist => "playlist",
            ContextKind::SmartPlaylist => "smart_playlist",
            ContextKind::BuilderSession => "builder_session",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "playlist" => Some(ContextKind::Playlist),
            "smart_playlist" => Some(ContextKind::SmartPlaylist),
            "builder_session" => Some(ContextKind::BuilderSession),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContextKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Source of eligible tracks plus the ordering requested when it was started
///
/// Immutable once a queue has been built from it; ordering changes made later
/// live on the queue, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackContext {
    pub kind: ContextKind,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_spec: Option<SortSpec>,
    #[serde(default)]
    pub shuffle: bool,
}

impl PlaybackContext {
    pub fn new(kind: ContextKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            sort_spec: None,
            shuffle: false,
        }
    }

    pub fn playlist(id: impl Into<String>) -> Self {
        Self::new(ContextKind::Playlist, id)
    }

    pub fn smart_playlist(id: impl Into<String>) -> Self {
        Self::new(ContextKind::SmartPlaylist, id)
    }

    pub fn builder_session(id: impl Into<String>) -> Self {
        Self::new(ContextKind::BuilderSession, id)
    }

    #[must_use]
    pub fn shuffled(mut self) -> Self {
        self.shuffle = true;
        self
    }

    #[must_use]
    pub fn sorted_by(mut self, spec: SortSpec) -> Self {
        self.shuffle = false;
        self.sort_spec = Some(spec);
        self
    }

    /// Reject contexts missing their identity
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(SoulError::invalid_input(format!(
                "{} context requires a non-empty id",
                self.kind
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for PlaybackContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}
