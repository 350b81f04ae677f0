use crate::domain::error::DomainError;
use crate::domain::ports::document_store::DocumentStore;
use crate::domain::ports::similarity_index::SimilarityIndex;
use crate::domain::values::similarity::{cosine_similarity, ScoredId, TopK};
use std::sync::Arc;
use tracing::debug;

/// Exhaustive cosine scan over a store snapshot, O(n·d) per query.
pub struct BruteForceIndex {
    store: Arc<dyn DocumentStore>,
}

impl BruteForceIndex {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

impl SimilarityIndex for BruteForceIndex {
    fn query(&self, vector: &[f64], k: usize) -> Result<Vec<ScoredId>, DomainError> {
        if vector.iter().any(|x| !x.is_finite()) {
            return Err(DomainError::InvalidInput(
                "query vector contains non-finite components".into(),
            ));
        }
        if k == 0 || vector.is_empty() {
            return Ok(vec![]);
        }

        let mut top = TopK::new(k);
        let mut scanned = 0usize;
        let mut skipped = 0usize;
        for record in self.store.all_records()? {
            scanned += 1;
            if record.vector.len() != vector.len() {
                skipped += 1;
                continue;
            }
            let score = cosine_similarity(vector, &record.vector);
            top.push(ScoredId::new(record.id, score));
        }

        let results = top.into_sorted_vec();
        debug!(scanned, skipped, returned = results.len(), k, "brute-force query");
        Ok(results)
    }
}
