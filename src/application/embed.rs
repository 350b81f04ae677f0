use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::{EmbeddingFunction, InputType};
use std::time::Duration;

/// Runs `embed_many` under a deadline. A timeout, a batch of the wrong
/// size, or a NaN or infinite component is reported as `EmbeddingUnavailable`.
pub async fn embed_with_timeout(
    embedder: &dyn EmbeddingFunction,
    texts: &[String],
    input_type: InputType,
    timeout: Duration,
) -> Result<Vec<Vec<f64>>, DomainError> {
    let vectors = tokio::time::timeout(timeout, embedder.embed_many(texts, input_type))
        .await
        .map_err(|_| {
            DomainError::EmbeddingUnavailable(format!(
                "{} embedder timed out after {:?}",
                embedder.name(),
                timeout
            ))
        })??;
    if vectors.len() != texts.len() {
        return Err(DomainError::EmbeddingUnavailable(format!(
            "{} embedder returned {} vectors for {} texts",
            embedder.name(),
            vectors.len(),
            texts.len()
        )));
    }
    if vectors.iter().flatten().any(|x| !x.is_finite()) {
        return Err(DomainError::EmbeddingUnavailable(format!(
            "{} embedder returned non-finite components",
            embedder.name()
        )));
    }
    Ok(vectors)
}

pub async fn embed_one_with_timeout(
    embedder: &dyn EmbeddingFunction,
    text: &str,
    input_type: InputType,
    timeout: Duration,
) -> Result<Vec<f64>, DomainError> {
    let mut vectors = embed_with_timeout(embedder, &[text.to_string()], input_type, timeout).await?;
    Ok(vectors.pop().unwrap_or_default())
}
