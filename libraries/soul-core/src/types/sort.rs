//! Sort specification for deterministic queue ordering
//!
//! Sorting is NULL-safe: a track without a value for the sort field is ordered
//! as if it carried the field's documented default (see [`SortField::default_key`]).

use crate::types::TrackRecord;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Default BPM substituted for tracks without tempo analysis
pub const DEFAULT_BPM: f64 = 120.0;

/// Default Elo rating substituted for unrated tracks
pub const DEFAULT_ELO_RATING: f64 = 1500.0;

/// Fields a queue can be sorted by
///
/// Unknown field names deserialize to [`SortField::TrackNumber`] rather than
/// failing, so a stale client cannot break queue construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortField {
    Title,
    Artist,
    Album,
    Year,
    Bpm,
    Key,
    EloRating,
    #[default]
    TrackNumber,
}

impl SortField {
    /// All sortable fields, in declaration order
    pub const ALL: [SortField; 8] = [
        SortField::Title,
        SortField::Artist,
        SortField::Album,
        SortField::Year,
        SortField::Bpm,
        SortField::Key,
        SortField::EloRating,
        SortField::TrackNumber,
    ];

    /// Convert to string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Artist => "artist",
            Self::Album => "album",
            Self::Year => "year",
            Self::Bpm => "bpm",
            Self::Key => "key",
            Self::EloRating => "elo_rating",
            Self::TrackNumber => "track_number",
        }
    }

    /// Parse from string (case-insensitive)
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "title" => Some(Self::Title),
            "artist" => Some(Self::Artist),
            "album" => Some(Self::Album),
            "year" => Some(Self::Year),
            "bpm" => Some(Self::Bpm),
            "key" => Some(Self::Key),
            "elo_rating" | "elo" => Some(Self::EloRating),
            "track_number" => Some(Self::TrackNumber),
            _ => None,
        }
    }

    /// Parse from string, falling back to [`SortField::TrackNumber`]
    pub fn from_str_or_default(s: &str) -> Self {
        Self::from_str(s).unwrap_or_else(|| {
            tracing::warn!("Unknown sort field {:?}, falling back to track_number", s);
            Self::TrackNumber
        })
    }

    /// Whether the field sorts numerically
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Year | Self::Bpm | Self::EloRating | Self::TrackNumber
        )
    }

    /// Key used in place of a missing value
    #[must_use]
    pub fn default_key(&self) -> SortKey {
        match self {
            Self::Title | Self::Artist | Self::Album | Self::Key => SortKey::Text(String::new()),
            Self::Year | Self::TrackNumber => SortKey::Number(0.0),
            Self::Bpm => SortKey::Number(DEFAULT_BPM),
            Self::EloRating => SortKey::Number(DEFAULT_ELO_RATING),
        }
    }
}

impl From<String> for SortField {
    fn from(s: String) -> Self {
        Self::from_str_or_default(&s)
    }
}

impl From<SortField> for String {
    fn from(field: SortField) -> Self {
        field.as_str().to_string()
    }
}

impl std::fmt::Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Convert to string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// Parse from string
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Asc),
            "desc" | "descending" => Some(Self::Desc),
            _ => None,
        }
    }

    /// Apply the direction to an ascending ordering
    #[must_use]
    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

/// Field + direction pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn asc(field: SortField) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: SortField) -> Self {
        Self::new(field, SortDirection::Desc)
    }

    /// Total order over tracks: sort key (with defaults) in the requested
    /// direction, then track id ascending.
    pub fn compare(&self, a: &TrackRecord, b: &TrackRecord) -> Ordering {
        let by_key = self
            .direction
            .apply(a.sort_key(self.field).cmp(&b.sort_key(self.field)));
        by_key.then_with(|| a.id.cmp(&b.id))
    }
}

impl std::fmt::Display for SortSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.direction.as_str())
    }
}

/// Comparable value extracted from a track for one sort field
#[derive(Debug, Clone)]
pub enum SortKey {
    Text(String),
    Number(f64),
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey {}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            // A field always yields the same variant; numbers first keeps this total.
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TrackId;

    fn with_bpm(id: &str, bpm: Option<f64>) -> TrackRecord {
        TrackRecord {
            bpm,
            ..TrackRecord::new(TrackId::new(id))
        }
    }

    #[test]
    fn unknown_field_falls_back_to_track_number() {
        let spec: SortSpec =
            serde_json::from_str(r#"{"field":"mood","direction":"desc"}"#).unwrap();
        assert_eq!(spec.field, SortField::TrackNumber);
        assert_eq!(spec.direction, SortDirection::Desc);
    }

    #[test]
    fn field_round_trips_through_its_name() {
        for field in SortField::ALL {
            assert_eq!(SortField::from_str(field.as_str()), Some(field));
        }
    }

    #[test]
    fn direction_defaults_to_ascending() {
        let spec: SortSpec = serde_json::from_str(r#"{"field":"bpm"}"#).unwrap();
        assert_eq!(spec, SortSpec::asc(SortField::Bpm));
    }

    #[test]
    fn missing_bpm_sorts_as_120() {
        let spec = SortSpec::asc(SortField::Bpm);
        let slow = with_bpm("a", Some(90.0));
        let missing = with_bpm("b", None);
        let fast = with_bpm("c", Some(128.0));

        assert_eq!(spec.compare(&slow, &missing), Ordering::Less);
        assert_eq!(spec.compare(&missing, &fast), Ordering::Less);
    }

    #[test]
    fn ties_break_on_track_id_in_both_directions() {
        let a = with_bpm("a", Some(100.0));
        let b = with_bpm("b", Some(100.0));

        assert_eq!(SortSpec::asc(SortField::Bpm).compare(&a, &b), Ordering::Less);
        assert_eq!(SortSpec::desc(SortField::Bpm).compare(&a, &b), Ordering::Less);
    }

    #[test]
    fn descending_reverses_key_order() {
        let spec = SortSpec::desc(SortField::Bpm);
        let slow = with_bpm("a", Some(90.0));
        let fast = with_bpm("b", Some(140.0));
        assert_eq!(spec.compare(&fast, &slow), Ordering::Less);
    }
}
