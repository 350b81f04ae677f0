use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    Document,
    Query,
}

/// Text → fixed-length vector.
///
/// Implementations must be deterministic for a fixed model, free of side
/// effects, and return the empty vector for empty text. `embed_many` must
/// return one vector per input, in input order, each equal to what `embed`
/// returns for that text. Backend failures surface as
/// [`DomainError::EmbeddingUnavailable`].
#[async_trait::async_trait]
pub trait EmbeddingFunction: Send + Sync {
    async fn embed_many(&self, texts: &[String], input_type: InputType) -> Result<Vec<Vec<f64>>, DomainError>;

    async fn embed(&self, text: &str, input_type: InputType) -> Result<Vec<f64>, DomainError> {
        let mut vectors = self.embed_many(&[text.to_string()], input_type).await?;
        vectors
            .pop()
            .ok_or_else(|| DomainError::EmbeddingUnavailable("embedder returned no vector".into()))
    }

    /// Output length for non-empty text, or 0 when unknown.
    fn dimension(&self) -> usize;

    fn name(&self) -> &str;
}
