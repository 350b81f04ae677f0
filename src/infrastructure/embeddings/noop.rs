use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::{EmbeddingFunction, InputType};

/// Storage-only mode: every text maps to the empty vector.
pub struct NoopEmbedder;

#[async_trait::async_trait]
impl EmbeddingFunction for NoopEmbedder {
    async fn embed_many(&self, texts: &[String], _input_type: InputType) -> Result<Vec<Vec<f64>>, DomainError> {
        Ok(texts.iter().map(|_| vec![]).collect())
    }

    fn dimension(&self) -> usize {
        0
    }

    fn name(&self) -> &str {
        "noop"
    }
}
