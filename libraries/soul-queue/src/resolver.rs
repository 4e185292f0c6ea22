//! Candidate resolution against the track metadata store
//!
//! Resolver output is never cached: smart playlists evaluate live, so every
//! window build, refill and rebuild asks the store again.

use crate::error::Result;
use crate::types::QueueOrder;
use soul_core::storage::TrackMetadataStore;
use soul_core::types::{PlaybackContext, TrackId, TrackRecord};

/// Resolve the candidates of `context` in the shape `order` needs
///
/// Shuffle only needs ids. Sorted needs metadata to compute sort keys, so the
/// resolved ids are hydrated with one `fetch_metadata` call.
pub async fn resolve_candidates(
    store: &dyn TrackMetadataStore,
    context: &PlaybackContext,
    order: &QueueOrder,
) -> Result<Vec<TrackRecord>> {
    let ids = store.resolve_context(context).await?;
    tracing::debug!("Resolved {} candidates for {}", ids.len(), context);

    match order {
        QueueOrder::Shuffle => Ok(ids.into_iter().map(TrackRecord::new).collect()),
        QueueOrder::Sorted(_) => {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            let ids: Vec<TrackId> = ids.into_iter().collect();
            Ok(store.fetch_metadata(&ids, false).await?)
        }
    }
}
