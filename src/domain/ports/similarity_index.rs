use crate::domain::error::DomainError;
use crate::domain::values::similarity::ScoredId;

/// Read path answering nearest-neighbour queries.
///
/// Results hold at most `k` entries, sorted by descending cosine score with
/// ties broken by ascending id. Records whose vector is empty or whose
/// length differs from the query are skipped. An index with nothing
/// scorable returns an empty list.
pub trait SimilarityIndex: Send + Sync {
    fn query(&self, vector: &[f64], k: usize) -> Result<Vec<ScoredId>, DomainError>;
}
