//! Incremental sampler: one replacement track per call
//!
//! The returned id is never a member of the exclusion set. Running out of
//! candidates is a normal outcome and yields `None`.

use crate::error::{QueueError, Result};
use crate::resolver::resolve_candidates;
use crate::sampling::{eligible, pick_one, sort_candidates};
use crate::types::QueueOrder;
use rand::Rng;
use soul_core::storage::TrackMetadataStore;
use soul_core::types::{PlaybackContext, SortSpec, TrackId, TrackRecord};
use std::collections::HashSet;

/// Pick the next track from already-resolved candidates
///
/// Sorted mode starts at `position_hint mod candidates` when a hint is given
/// (wrapping past the end of the sorted list back to its start) and at the
/// head of the sort otherwise, then walks forward to the first id outside
/// `exclusion`.
pub fn pick_next<R: Rng + ?Sized>(
    candidates: Vec<TrackRecord>,
    exclusion: &HashSet<TrackId>,
    order: &QueueOrder,
    position_hint: Option<usize>,
    rng: &mut R,
) -> Option<TrackId> {
    match order {
        QueueOrder::Shuffle => {
            let ids: Vec<TrackId> = eligible(candidates, exclusion)
                .into_iter()
                .map(|track| track.id)
                .collect();
            pick_one(&ids, rng)
        }
        QueueOrder::Sorted(spec) => {
            let sorted = sorted_eligible(candidates, spec);
            if sorted.is_empty() {
                return None;
            }
            let start = position_hint.map_or(0, |hint| hint % sorted.len());
            first_outside(&sorted, exclusion, start)
        }
    }
}

/// Pick the track that follows `last` in `order`
///
/// Sorted mode resumes the sort right after `last`, so a future that was
/// rebuilt from the head of the sort continues without gaps. When `last` is
/// no longer a candidate, `fallback_hint` is used as in [`pick_next`].
/// Shuffle mode ignores `last`.
pub fn pick_after<R: Rng + ?Sized>(
    candidates: Vec<TrackRecord>,
    exclusion: &HashSet<TrackId>,
    order: &QueueOrder,
    last: Option<&TrackId>,
    fallback_hint: Option<usize>,
    rng: &mut R,
) -> Option<TrackId> {
    let QueueOrder::Sorted(spec) = order else {
        return pick_next(candidates, exclusion, order, None, rng);
    };

    let sorted = sorted_eligible(candidates, spec);
    if sorted.is_empty() {
        return None;
    }
    let start = last
        .and_then(|last| sorted.iter().position(|track| &track.id == last))
        .map(|index| index + 1)
        .or(fallback_hint)
        .map_or(0, |hint| hint % sorted.len());
    first_outside(&sorted, exclusion, start)
}

fn sorted_eligible(candidates: Vec<TrackRecord>, spec: &SortSpec) -> Vec<TrackRecord> {
    let mut sorted = eligible(candidates, &HashSet::new());
    sort_candidates(&mut sorted, spec);
    sorted
}

/// First id at or after `start` (wrapping once) that is not excluded
fn first_outside(
    sorted: &[TrackRecord],
    exclusion: &HashSet<TrackId>,
    start: usize,
) -> Option<TrackId> {
    (start..sorted.len())
        .chain(0..start)
        .map(|i| &sorted[i].id)
        .find(|id| !exclusion.contains(*id))
        .cloned()
}

/// Resolve `context` and pick one track outside `exclusion`
pub async fn get_next_track(
    store: &dyn TrackMetadataStore,
    context: &PlaybackContext,
    exclusion: &HashSet<TrackId>,
    order: QueueOrder,
    position_hint: Option<usize>,
) -> Result<Option<TrackId>> {
    context
        .validate()
        .map_err(|e| QueueError::InvalidContext(e.to_string()))?;

    let candidates = resolve_candidates(store, context, &order).await?;
    let mut rng = rand::thread_rng();
    Ok(pick_next(candidates, exclusion, &order, position_hint, &mut rng))
}
