use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Why a record does or does not carry a vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingStatus {
    /// Vector present and scorable.
    Embedded,
    /// The embedder produced no vector (empty text, or a storage-only embedder).
    Empty,
    /// The embedding backend failed or timed out; eligible for reindex.
    Failed,
}

impl EmbeddingStatus {
    pub fn for_vector(vector: &[f64]) -> Self {
        if vector.is_empty() {
            EmbeddingStatus::Empty
        } else {
            EmbeddingStatus::Embedded
        }
    }
}

impl fmt::Display for EmbeddingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbeddingStatus::Embedded => write!(f, "embedded"),
            EmbeddingStatus::Empty => write!(f, "empty"),
            EmbeddingStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for EmbeddingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "embedded" => Ok(EmbeddingStatus::Embedded),
            "empty" => Ok(EmbeddingStatus::Empty),
            "failed" => Ok(EmbeddingStatus::Failed),
            _ => Err(format!("Unknown embedding status: {s}")),
        }
    }
}
