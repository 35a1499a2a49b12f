//! # Comparator Module
//!
//! Builds the similarity graph over a batch and splits it into clusters.
//!
//! ## How It Works
//! 1. Compare every unordered pair of fingerprints using Hamming distance
//! 2. Keep the pair as an edge when the distance is within the threshold
//! 3. Assemble connected components (transitive grouping)
//!
//! Pairwise comparison is O(n²). Batches are user-submitted photo sets
//! capped by `max_batch_size`, so the quadratic cost is accepted.

mod grouper;
mod traits;

pub use grouper::{Clustering, TransitiveGrouper};
pub use traits::{ComparisonStrategy, ThresholdStrategy, DEFAULT_THRESHOLD};

use crate::core::hasher::Fingerprint;
use crate::events::{null_sender, CompareEvent, CompareProgress, Event, EventSender};
use serde::{Deserialize, Serialize};

/// An undirected edge of the adjacency relation, stored with `a < b`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Smaller batch index
    pub a: usize,
    /// Larger batch index
    pub b: usize,
    /// Hamming distance between the two fingerprints
    pub distance: u32,
}

/// Build the adjacency relation for a batch of fingerprints.
///
/// Edges come out sorted by `(a, b)` whatever order the fingerprints are in.
pub fn build_adjacency(
    fingerprints: &[(usize, Fingerprint)],
    strategy: &dyn ComparisonStrategy,
) -> Vec<Edge> {
    build_adjacency_with_events(fingerprints, strategy, &null_sender())
}

/// Build the adjacency relation, emitting progress every ~1000 comparisons
pub fn build_adjacency_with_events(
    fingerprints: &[(usize, Fingerprint)],
    strategy: &dyn ComparisonStrategy,
    events: &EventSender,
) -> Vec<Edge> {
    let n = fingerprints.len();
    let total_comparisons = n.saturating_sub(1) * n / 2;

    events.send(Event::Compare(CompareEvent::Started { total_photos: n }));

    let update_interval = total_comparisons.clamp(1, 1000);
    let mut edges = Vec::new();
    let mut comparisons_completed = 0;

    for (i, (index_i, fp_i)) in fingerprints.iter().enumerate() {
        for (index_j, fp_j) in &fingerprints[i + 1..] {
            let distance = fp_i.distance(fp_j);

            if strategy.is_duplicate(distance) && index_i != index_j {
                edges.push(Edge {
                    a: *index_i.min(index_j),
                    b: *index_i.max(index_j),
                    distance,
                });
            }

            comparisons_completed += 1;
            if comparisons_completed % update_interval == 0 {
                events.send(Event::Compare(CompareEvent::Progress(CompareProgress {
                    comparisons_completed,
                    total_comparisons,
                    edges_found: edges.len(),
                })));
            }
        }
    }

    edges.sort_by_key(|edge| (edge.a, edge.b));

    events.send(Event::Compare(CompareEvent::Completed {
        total_edges: edges.len(),
    }));

    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventChannel;

    fn fp(bits: u64) -> Fingerprint {
        Fingerprint::from_bits(bits)
    }

    #[test]
    fn empty_and_single_inputs_have_no_edges() {
        let strategy = ThresholdStrategy::default();
        assert!(build_adjacency(&[], &strategy).is_empty());
        assert!(build_adjacency(&[(0, fp(1))], &strategy).is_empty());
    }

    #[test]
    fn only_pairs_within_threshold_are_linked() {
        let strategy = ThresholdStrategy::new(5).unwrap();
        let fingerprints = vec![(0, fp(0xFF)), (1, fp(0xFF)), (2, fp(0x00))];

        let edges = build_adjacency(&fingerprints, &strategy);

        // 0-2 and 1-2 differ in 8 bits
        assert_eq!(edges.len(), 1);
        assert_eq!((edges[0].a, edges[0].b), (0, 1));
        assert_eq!(edges[0].distance, 0);
    }

    #[test]
    fn edges_are_normalized_and_sorted() {
        let strategy = ThresholdStrategy::default();
        let fingerprints = vec![(9, fp(0)), (4, fp(1)), (2, fp(3))];

        let edges = build_adjacency(&fingerprints, &strategy);
        let pairs: Vec<_> = edges.iter().map(|e| (e.a, e.b)).collect();

        assert_eq!(pairs, vec![(2, 4), (2, 9), (4, 9)]);
    }

    #[test]
    fn raising_threshold_never_removes_edges() {
        let fingerprints: Vec<_> = (0..12u64)
            .map(|i| (i as usize, fp(i.wrapping_mul(0x9E37_79B9_7F4A_7C15))))
            .collect();

        let mut previous: Vec<(usize, usize)> = Vec::new();
        for threshold in 0..=64 {
            let strategy = ThresholdStrategy::new(threshold).unwrap();
            let current: Vec<_> = build_adjacency(&fingerprints, &strategy)
                .iter()
                .map(|e| (e.a, e.b))
                .collect();
            assert!(previous.iter().all(|pair| current.contains(pair)));
            previous = current;
        }
        assert_eq!(previous.len(), 12 * 11 / 2);
    }

    #[test]
    fn emits_started_and_completed() {
        let (sender, receiver) = EventChannel::new();
        let strategy = ThresholdStrategy::default();
        let fingerprints: Vec<_> = (0..50).map(|i| (i, fp(i as u64))).collect();

        let edges = build_adjacency_with_events(&fingerprints, &strategy, &sender);
        drop(sender);
        let events: Vec<_> = receiver.iter().collect();

        match &events[0] {
            Event::Compare(CompareEvent::Started { total_photos }) => {
                assert_eq!(*total_photos, 50);
            }
            _ => panic!("Expected Started event"),
        }
        match events.last().unwrap() {
            Event::Compare(CompareEvent::Completed { total_edges }) => {
                assert_eq!(*total_edges, edges.len());
            }
            _ => panic!("Expected Completed event"),
        }
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::Compare(CompareEvent::Progress(_)))));
    }
}
