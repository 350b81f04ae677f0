use crate::domain::entities::vector_record::Metadata;
use serde::{Deserialize, Serialize};

/// A ranked search result enriched from the stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    /// Cosine similarity in [-1, 1].
    pub score: f64,
    pub text_preview: String,
    pub metadata: Metadata,
}
