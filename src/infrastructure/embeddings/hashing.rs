//! Feature-hashing bag-of-words embedder.
//!
//! Each lowercase alphanumeric token is hashed with 64-bit FNV-1a; the low
//! bits pick a bucket and the top bit picks a sign. The bucket counts are
//! L2-normalised, so texts sharing vocabulary point the same way. Output is
//! identical across runs, processes and platforms.

use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::{EmbeddingFunction, InputType};

pub const DEFAULT_DIMENSION: usize = 256;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Result<Self, DomainError> {
        if dimension == 0 {
            return Err(DomainError::Config("hashing embedder dimension must be positive".into()));
        }
        Ok(Self { dimension })
    }

    /// Empty when the text has no alphanumeric tokens.
    pub fn embed_text(&self, text: &str) -> Vec<f64> {
        let mut vector = vec![0.0_f64; self.dimension];
        let mut tokens = 0usize;
        for token in tokenize(text) {
            let hash = fnv1a(token.as_bytes());
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
            tokens += 1;
        }
        if tokens == 0 {
            return vec![];
        }
        let norm = vector.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm > 0.0 {
            for x in vector.iter_mut() {
                *x /= norm;
            }
        }
        vector
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self {
            dimension: DEFAULT_DIMENSION,
        }
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME)
    })
}

#[async_trait::async_trait]
impl EmbeddingFunction for HashingEmbedder {
    async fn embed_many(&self, texts: &[String], _input_type: InputType) -> Result<Vec<Vec<f64>>, DomainError> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::values::similarity::cosine_similarity;

    #[test]
    fn test_fnv1a_reference_values() {
        assert_eq!(fnv1a(b""), FNV_OFFSET);
        assert_eq!(fnv1a(b"a"), 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn test_empty_and_symbol_only_text_is_unembeddable() {
        let e = HashingEmbedder::default();
        assert!(e.embed_text("").is_empty());
        assert!(e.embed_text("   \n\t").is_empty());
        assert!(e.embed_text("!!! ---").is_empty());
    }

    #[test]
    fn test_output_is_unit_length_with_configured_dimension() {
        let e = HashingEmbedder::new(64).unwrap();
        let v = e.embed_text("Termination clause for breach of contract");
        assert_eq!(v.len(), 64);
        let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_case_and_punctuation_do_not_matter() {
        let e = HashingEmbedder::default();
        assert_eq!(e.embed_text("Contract, Dispute!"), e.embed_text("contract dispute"));
    }

    #[test]
    fn test_shared_vocabulary_scores_higher() {
        let e = HashingEmbedder::default();
        let q = e.embed_text("contract termination");
        let related = e.embed_text("termination of the contract by either party");
        let unrelated = e.embed_text("bake the bread for forty minutes");
        assert!(cosine_similarity(&q, &related) > cosine_similarity(&q, &unrelated));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(matches!(HashingEmbedder::new(0), Err(DomainError::Config(_))));
    }
}
