//! Window rebuilder
//!
//! Regenerates the future of a queue after an ordering change. History and
//! the current track (`queue[..=cursor]`) are copied verbatim and excluded
//! from the new future, so nothing already heard moves or disappears.

use crate::error::Result;
use crate::queue::Queue;
use crate::resolver::resolve_candidates;
use crate::types::QueueOrder;
use crate::window::select_window;
use rand::Rng;
use soul_core::storage::TrackMetadataStore;
use soul_core::types::{TrackId, TrackRecord};
use std::collections::HashSet;

/// Size of the regenerated future
///
/// `window_size - preserved`, but never zero: once history alone fills the
/// window the rebuild still queues one track so refills can take over.
fn future_size(window_size: usize, preserved: usize) -> usize {
    window_size.saturating_sub(preserved).max(1)
}

/// Rebuild `queue` over already-resolved candidates
pub fn rebuild_window<R: Rng + ?Sized>(
    queue: &Queue,
    candidates: Vec<TrackRecord>,
    window_size: usize,
    order: QueueOrder,
    rng: &mut R,
) -> Queue {
    let preserved = queue.preserved();
    let exclusion: HashSet<TrackId> = preserved.iter().cloned().collect();
    let future = select_window(
        candidates,
        &exclusion,
        future_size(window_size, preserved.len()),
        &order,
        rng,
    );

    tracing::debug!(
        "Rebuilt queue as {}: kept {} preserved tracks, {} new",
        order,
        preserved.len(),
        future.len()
    );

    let mut rebuilt = queue.clone();
    rebuilt.replace_future(future, order);
    rebuilt
}

/// Resolve the queue's context again and rebuild its future under `order`
pub async fn rebuild_queue(
    store: &dyn TrackMetadataStore,
    queue: &Queue,
    window_size: usize,
    order: QueueOrder,
) -> Result<Queue> {
    let candidates = resolve_candidates(store, queue.context(), &order).await?;
    let mut rng = rand::thread_rng();
    Ok(rebuild_window(queue, candidates, window_size, order, &mut rng))
}
