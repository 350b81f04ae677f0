use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::{EmbeddingFunction, InputType};

/// Three-component character statistics:
/// `[char_count, code_sum % 1000, (code_sum / (char_count + 1)) % 100]`.
///
/// Carries no meaning beyond "equal texts give equal vectors". Kept for
/// stores that were populated with it.
pub struct CharStatsEmbedder;

impl CharStatsEmbedder {
    pub fn embed_text(text: &str) -> Vec<f64> {
        if text.is_empty() {
            return vec![];
        }
        let length = text.chars().count() as u64;
        let code_sum: u64 = text.chars().map(u64::from).sum();
        let avg = (code_sum / (length + 1)) % 100;
        vec![length as f64, (code_sum % 1000) as f64, avg as f64]
    }
}

#[async_trait::async_trait]
impl EmbeddingFunction for CharStatsEmbedder {
    async fn embed_many(&self, texts: &[String], _input_type: InputType) -> Result<Vec<Vec<f64>>, DomainError> {
        Ok(texts.iter().map(|t| Self::embed_text(t)).collect())
    }

    fn dimension(&self) -> usize {
        3
    }

    fn name(&self) -> &str {
        "charstats"
    }
}
