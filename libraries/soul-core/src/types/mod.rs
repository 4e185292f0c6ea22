mod context;
mod ids;
mod snapshot;
mod sort;
mod track;

pub use context::{ContextKind, PlaybackContext};
pub use ids::TrackId;
pub use snapshot::{QueueMode, QueueSnapshot};
pub use sort::{SortDirection, SortField, SortKey, SortSpec, DEFAULT_BPM, DEFAULT_ELO_RATING};
pub use track::TrackRecord;
