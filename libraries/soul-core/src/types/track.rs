/// Track metadata as seen by the queue
use crate::types::{SortField, SortKey, TrackId};
use serde::{Deserialize, Serialize};

/// Track metadata row
///
/// Every field except `id` may be absent; sorting substitutes the field's
/// default for missing values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRecord {
    /// Unique track identifier
    pub id: TrackId,

    /// Track title
    #[serde(default)]
    pub title: Option<String>,

    /// Artist name
    #[serde(default)]
    pub artist: Option<String>,

    /// Album name
    #[serde(default)]
    pub album: Option<String>,

    /// Release year
    #[serde(default)]
    pub year: Option<i32>,

    /// Tempo in beats per minute
    #[serde(default)]
    pub bpm: Option<f64>,

    /// Musical key (Camelot or open-key notation)
    #[serde(default)]
    pub key: Option<String>,

    /// Pairwise-comparison rating
    #[serde(default)]
    pub elo_rating: Option<f64>,

    /// Track number in album
    #[serde(default)]
    pub track_number: Option<i32>,
}

impl TrackRecord {
    /// Create a record carrying only an id
    pub fn new(id: TrackId) -> Self {
        Self {
            id,
            title: None,
            artist: None,
            album: None,
            year: None,
            bpm: None,
            key: None,
            elo_rating: None,
            track_number: None,
        }
    }

    /// Sort key for `field`, with the field default substituted for NULL
    pub fn sort_key(&self, field: SortField) -> SortKey {
        let text = |value: &Option<String>| value.clone().map(SortKey::Text);
        let key = match field {
            SortField::Title => text(&self.title),
            SortField::Artist => text(&self.artist),
            SortField::Album => text(&self.album),
            SortField::Key => text(&self.key),
            SortField::Year => self.year.map(|y| SortKey::Number(f64::from(y))),
            SortField::Bpm => self.bpm.map(SortKey::Number),
            SortField::EloRating => self.elo_rating.map(SortKey::Number),
            SortField::TrackNumber => self.track_number.map(|n| SortKey::Number(f64::from(n))),
        };
        key.unwrap_or_else(|| field.default_key())
    }
}

impl From<TrackId> for TrackRecord {
    fn from(id: TrackId) -> Self {
        Self::new(id)
    }
}
