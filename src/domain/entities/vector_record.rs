use crate::domain::values::embedding_status::EmbeddingStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque passthrough metadata, e.g. `{"source_filename": "lease.pdf"}`.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub text: String,
    pub vector: Vec<f64>,
    pub metadata: Metadata,
    pub embedding_status: EmbeddingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VectorRecord {
    /// Builds a record whose status follows from the vector: empty means
    /// no embedding, anything else is embedded. An empty `id` is replaced
    /// by a fresh UUID when the record is upserted.
    pub fn new(id: impl Into<String>, text: impl Into<String>, vector: Vec<f64>, metadata: Metadata) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            text: text.into(),
            embedding_status: EmbeddingStatus::for_vector(&vector),
            vector,
            metadata,
            created_at: now,
            updated_at: now,
        }
    }

    /// A text-only record left for a later reindex.
    pub fn failed(id: impl Into<String>, text: impl Into<String>, metadata: Metadata) -> Self {
        let mut record = Self::new(id, text, vec![], metadata);
        record.embedding_status = EmbeddingStatus::Failed;
        record
    }

    pub fn dimension(&self) -> usize {
        self.vector.len()
    }

    /// Whether this record can take part in similarity scoring.
    pub fn is_scorable(&self) -> bool {
        !self.vector.is_empty()
    }

    /// First `max_chars` characters of the text.
    pub fn text_preview(&self, max_chars: usize) -> String {
        match self.text.char_indices().nth(max_chars) {
            Some((byte_idx, _)) => self.text[..byte_idx].to_string(),
            None => self.text.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_follows_vector() {
        let embedded = VectorRecord::new("a", "text", vec![1.0], Metadata::new());
        assert_eq!(embedded.embedding_status, EmbeddingStatus::Embedded);
        assert_eq!(embedded.dimension(), 1);

        let empty = VectorRecord::new("b", "", vec![], Metadata::new());
        assert_eq!(empty.embedding_status, EmbeddingStatus::Empty);
        assert!(!empty.is_scorable());
    }

    #[test]
    fn test_preview_counts_characters_not_bytes() {
        let record = VectorRecord::new("a", "héllo wörld", vec![], Metadata::new());
        assert_eq!(record.text_preview(5), "héllo");
        assert_eq!(record.text_preview(100), "héllo wörld");
        assert_eq!(record.text_preview(0), "");
    }
}
