use crate::application::embed::embed_with_timeout;
use crate::domain::error::DomainError;
use crate::domain::ports::document_store::DocumentStore;
use crate::domain::ports::embedding_port::{EmbeddingFunction, InputType};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const BATCH_SIZE: usize = 32;

pub struct ReindexUseCase {
    store: Arc<dyn DocumentStore>,
    embedder: Arc<dyn EmbeddingFunction>,
    embedding_timeout: Duration,
}

impl ReindexUseCase {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        embedder: Arc<dyn EmbeddingFunction>,
        embedding_timeout: Duration,
    ) -> Self {
        Self {
            store,
            embedder,
            embedding_timeout,
        }
    }

    /// Embeds every record that has text but no vector. Returns how many
    /// records gained one. Batches that fail to embed are left untouched, as
    /// are records deleted or rewritten while their batch was embedding.
    pub async fn execute(&self) -> Result<usize, DomainError> {
        let pending = self.store.records_needing_embedding()?;
        if pending.is_empty() {
            return Ok(0);
        }
        info!(pending = pending.len(), embedder = self.embedder.name(), "reindexing");

        let mut embedded = 0usize;
        for chunk in pending.chunks(BATCH_SIZE) {
            let texts: Vec<String> = chunk.iter().map(|r| r.text.clone()).collect();
            let vectors = match embed_with_timeout(
                self.embedder.as_ref(),
                &texts,
                InputType::Document,
                self.embedding_timeout,
            )
            .await
            {
                Ok(vectors) => vectors,
                Err(DomainError::EmbeddingUnavailable(reason)) => {
                    warn!(%reason, batch = chunk.len(), "reindex batch failed, will retry on next run");
                    continue;
                }
                Err(e) => return Err(e),
            };

            for (record, vector) in chunk.iter().zip(vectors) {
                if vector.is_empty() {
                    continue;
                }
                match self.store.set_vector_if_unchanged(&record.id, record.updated_at, vector) {
                    Ok(true) => embedded += 1,
                    Ok(false) => debug!(id = %record.id, "record changed during reindex, left as is"),
                    Err(DomainError::DimensionMismatch { expected, actual }) => {
                        warn!(id = %record.id, expected, actual, "reindexed vector rejected");
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        info!(embedded, "reindex finished");
        Ok(embedded)
    }
}
