//! Window initializer
//!
//! Builds the first `window_size` tracks of a queue from a context's
//! candidates:
//! - fewer candidates than the window: all of them, shuffled or sorted
//! - shuffle: `window_size` distinct ids drawn uniformly without replacement
//! - sorted: the whole candidate set sorted, then the first `window_size`

use crate::error::{QueueError, Result};
use crate::queue::Queue;
use crate::resolver::resolve_candidates;
use crate::sampling::{eligible, sample_distinct, sort_candidates};
use crate::types::QueueOrder;
use rand::Rng;
use soul_core::storage::TrackMetadataStore;
use soul_core::types::{PlaybackContext, TrackId, TrackRecord};
use std::collections::HashSet;

/// Select up to `window_size` ids from `candidates` minus `exclusion`
pub fn select_window<R: Rng + ?Sized>(
    candidates: Vec<TrackRecord>,
    exclusion: &HashSet<TrackId>,
    window_size: usize,
    order: &QueueOrder,
    rng: &mut R,
) -> Vec<TrackId> {
    let mut candidates = eligible(candidates, exclusion);
    if window_size == 0 || candidates.is_empty() {
        return Vec::new();
    }

    match order {
        QueueOrder::Shuffle => {
            let ids = candidates.into_iter().map(|track| track.id).collect();
            sample_distinct(ids, window_size, rng)
        }
        QueueOrder::Sorted(spec) => {
            sort_candidates(&mut candidates, spec);
            candidates
                .into_iter()
                .take(window_size)
                .map(|track| track.id)
                .collect()
        }
    }
}

/// Build a fresh queue over already-resolved candidates
pub fn build_queue<R: Rng + ?Sized>(
    context: PlaybackContext,
    candidates: Vec<TrackRecord>,
    window_size: usize,
    order: QueueOrder,
    rng: &mut R,
) -> Queue {
    let available = candidates.len();
    let window = select_window(candidates, &HashSet::new(), window_size, &order, rng);
    tracing::debug!(
        "Built {} window of {} tracks from {} candidates for {}",
        order,
        window.len(),
        available,
        context
    );
    Queue::new(context, window, order)
}

/// Resolve `context` and build its first window
///
/// An empty or deleted context yields an empty (already exhausted) queue.
pub async fn initialize_queue(
    store: &dyn TrackMetadataStore,
    context: &PlaybackContext,
    window_size: usize,
    order: QueueOrder,
) -> Result<Queue> {
    context
        .validate()
        .map_err(|e| QueueError::InvalidContext(e.to_string()))?;

    let candidates = resolve_candidates(store, context, &order).await?;
    let mut rng = rand::thread_rng();
    Ok(build_queue(
        context.clone(),
        candidates,
        window_size,
        order,
        &mut rng,
    ))
}
