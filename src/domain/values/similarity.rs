//! Cosine scoring and deterministic top-k ranking.
//!
//! Ranking is a total order: higher score first, then ascending id. Two
//! implementations fed the same candidates always return the same list.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// An id paired with its similarity to a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredId {
    pub id: String,
    pub score: f64,
}

impl ScoredId {
    pub fn new(id: impl Into<String>, score: f64) -> Self {
        Self {
            id: id.into(),
            score,
        }
    }

    /// `Less` means `self` ranks ahead of `other`.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Cosine similarity of two equal-length vectors.
///
/// Returns 0.0 when the lengths differ, either vector is empty, or either
/// norm is zero. A zero vector is dissimilar to everything, itself included.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        (dot / denom).clamp(-1.0, 1.0)
    }
}

// Heap entry ordered so the worst-ranked candidate sits on top.
struct HeapEntry(ScoredId);

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.rank_cmp(&other.0)
    }
}

/// Bounded collector keeping the best `k` candidates seen so far.
pub struct TopK {
    k: usize,
    heap: BinaryHeap<HeapEntry>,
}

impl TopK {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            heap: BinaryHeap::with_capacity(k.min(1024)),
        }
    }

    pub fn push(&mut self, candidate: ScoredId) {
        if self.k == 0 {
            return;
        }
        if self.heap.len() < self.k {
            self.heap.push(HeapEntry(candidate));
            return;
        }
        let beats_worst = self
            .heap
            .peek()
            .map(|worst| candidate.rank_cmp(&worst.0) == Ordering::Less)
            .unwrap_or(false);
        if beats_worst {
            self.heap.pop();
            self.heap.push(HeapEntry(candidate));
        }
    }

    /// Best first.
    pub fn into_sorted_vec(self) -> Vec<ScoredId> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|entry| entry.0)
            .collect()
    }
}

/// Rank an arbitrary candidate set and keep the best `k`.
pub fn rank_top_k(candidates: impl IntoIterator<Item = ScoredId>, k: usize) -> Vec<ScoredId> {
    let mut top = TopK::new(k);
    for candidate in candidates {
        top.push(candidate);
    }
    top.into_sorted_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_vectors_score_one() {
        let v = [0.3, -1.2, 4.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_opposite_vectors_score_minus_one() {
        let v = [0.3, -1.2, 4.0];
        let neg: Vec<f64> = v.iter().map(|x| -x).collect();
        assert!((cosine_similarity(&v, &neg) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_vector_scores_zero_even_against_itself() {
        let zero = [0.0, 0.0];
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
        assert_eq!(cosine_similarity(&zero, &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_length_mismatch_scores_zero() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_ties_break_by_ascending_id() {
        let ranked = rank_top_k(
            vec![
                ScoredId::new("c", 0.5),
                ScoredId::new("a", 0.5),
                ScoredId::new("z", 0.9),
                ScoredId::new("b", 0.5),
            ],
            10,
        );
        let ids: Vec<&str> = ranked.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a", "b", "c"]);
    }

    #[test]
    fn test_top_k_keeps_best_only() {
        let candidates = (0..50).map(|i| ScoredId::new(format!("id{i:02}"), i as f64 / 50.0));
        let ranked = rank_top_k(candidates, 3);
        let ids: Vec<&str> = ranked.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["id49", "id48", "id47"]);
    }

    #[test]
    fn test_top_k_zero_is_empty() {
        assert!(rank_top_k(vec![ScoredId::new("a", 1.0)], 0).is_empty());
    }

    #[test]
    fn test_tie_at_cutoff_prefers_smaller_id() {
        let ranked = rank_top_k(
            vec![
                ScoredId::new("b", 0.7),
                ScoredId::new("c", 0.7),
                ScoredId::new("a", 0.7),
            ],
            2,
        );
        let ids: Vec<&str> = ranked.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
