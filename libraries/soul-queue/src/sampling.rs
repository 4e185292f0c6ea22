//! Sampling algorithms shared by the window initializer, sampler and rebuilder
//!
//! Shuffle draws use Fisher-Yates (full or partial), so every candidate has
//! the same chance regardless of the order the resolver returned it in.
//! Sorted draws use [`SortSpec::compare`], a total order with NULL defaults
//! and a track-id tie-break, so the same candidates always sort identically.

use rand::seq::SliceRandom;
use rand::Rng;
use soul_core::types::{SortSpec, TrackId, TrackRecord};
use std::collections::HashSet;

/// Drop excluded and duplicate candidates, keeping first occurrences
pub fn eligible(candidates: Vec<TrackRecord>, exclusion: &HashSet<TrackId>) -> Vec<TrackRecord> {
    let mut seen = HashSet::with_capacity(candidates.len());
    candidates
        .into_iter()
        .filter(|track| !exclusion.contains(&track.id) && seen.insert(track.id.clone()))
        .collect()
}

/// Draw up to `amount` distinct ids uniformly without replacement
///
/// The result is itself in random order. With `amount >= ids.len()` this is
/// a full shuffle.
pub fn sample_distinct<R: Rng + ?Sized>(
    mut ids: Vec<TrackId>,
    amount: usize,
    rng: &mut R,
) -> Vec<TrackId> {
    let amount = amount.min(ids.len());
    let (picked, _) = ids.partial_shuffle(rng, amount);
    picked.to_vec()
}

/// Pick one id uniformly
pub fn pick_one<R: Rng + ?Sized>(ids: &[TrackId], rng: &mut R) -> Option<TrackId> {
    ids.choose(rng).cloned()
}

/// Sort candidates in place by `spec`
pub fn sort_candidates(candidates: &mut [TrackRecord], spec: &SortSpec) {
    candidates.sort_by(|a, b| spec.compare(a, b));
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use soul_core::types::SortField;

    fn records(ids: &[&str]) -> Vec<TrackRecord> {
        ids.iter().map(|id| TrackRecord::new(TrackId::new(*id))).collect()
    }

    fn id_list(n: usize) -> Vec<TrackId> {
        (0..n).map(|i| TrackId::new(i.to_string())).collect()
    }

    #[test]
    fn eligible_removes_excluded_and_duplicates() {
        let exclusion: HashSet<TrackId> = [TrackId::new("b")].into_iter().collect();
        let result = eligible(records(&["a", "b", "c", "a"]), &exclusion);
        let ids: Vec<&str> = result.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn sample_distinct_returns_unique_subset() {
        let mut rng = StdRng::seed_from_u64(7);
        let picked = sample_distinct(id_list(50), 10, &mut rng);

        assert_eq!(picked.len(), 10);
        let unique: HashSet<_> = picked.iter().collect();
        assert_eq!(unique.len(), 10);
    }

    #[test]
    fn sample_distinct_caps_at_available() {
        let mut rng = StdRng::seed_from_u64(7);
        let picked = sample_distinct(id_list(3), 10, &mut rng);
        assert_eq!(picked.len(), 3);
    }

    #[test]
    fn sample_distinct_is_not_biased_to_insertion_order() {
        // Over many draws of 1 from 4, every position should be picked
        let mut rng = StdRng::seed_from_u64(42);
        let mut counts = [0usize; 4];
        for _ in 0..4000 {
            let picked = sample_distinct(id_list(4), 1, &mut rng);
            let index: usize = picked[0].as_str().parse().unwrap();
            counts[index] += 1;
        }
        // Expected ~1000 each
        assert!(counts.iter().all(|&c| c > 800), "skewed counts: {:?}", counts);
    }

    #[test]
    fn pick_one_from_empty_is_none() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(pick_one(&[], &mut rng).is_none());
    }

    #[test]
    fn sort_candidates_orders_by_title_then_id() {
        let mut tracks = vec![
            TrackRecord {
                title: Some("b".into()),
                ..TrackRecord::new(TrackId::new("1"))
            },
            TrackRecord::new(TrackId::new("3")),
            TrackRecord {
                title: Some("a".into()),
                ..TrackRecord::new(TrackId::new("2"))
            },
            TrackRecord::new(TrackId::new("0")),
        ];

        sort_candidates(&mut tracks, &SortSpec::asc(SortField::Title));

        let ids: Vec<&str> = tracks.iter().map(|t| t.id.as_str()).collect();
        // Missing titles sort as "" ahead of everything, tie broken by id
        assert_eq!(ids, vec!["0", "3", "2", "1"]);
    }
}
