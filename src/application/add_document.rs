use crate::application::embed::embed_one_with_timeout;
use crate::domain::entities::vector_record::{Metadata, VectorRecord};
use crate::domain::error::DomainError;
use crate::domain::ports::document_store::DocumentStore;
use crate::domain::ports::embedding_port::{EmbeddingFunction, InputType};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub struct AddDocumentUseCase {
    store: Arc<dyn DocumentStore>,
    embedder: Arc<dyn EmbeddingFunction>,
    embedding_timeout: Duration,
}

impl AddDocumentUseCase {
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

    /// Embed and upsert. Ingestion never blocks on the embedding backend:
    /// a failed or timed-out embedding stores the text with status `failed`.
    /// The upsert runs only once embedding has finished either way.
    pub async fn execute(
        &self,
        id: Option<String>,
        text: String,
        metadata: Metadata,
    ) -> Result<String, DomainError> {
        let id = id.unwrap_or_default();

        let embedding = if text.is_empty() {
            Ok(vec![])
        } else {
            embed_one_with_timeout(
                self.embedder.as_ref(),
                &text,
                InputType::Document,
                self.embedding_timeout,
            )
            .await
        };

        let record = match embedding {
            Ok(vector) => VectorRecord::new(id, text, vector, metadata),
            Err(DomainError::EmbeddingUnavailable(reason)) => {
                warn!(
                    embedder = self.embedder.name(),
                    %reason,
                    "embedding failed, storing document without vector"
                );
                VectorRecord::failed(id, text, metadata)
            }
            Err(e) => return Err(e),
        };

        let status = record.embedding_status;
        let id = self.store.upsert(record)?;
        info!(%id, %status, "document added");
        Ok(id)
    }
}
