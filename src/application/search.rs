use crate::application::embed::embed_one_with_timeout;
use crate::domain::entities::search_hit::SearchHit;
use crate::domain::error::DomainError;
use crate::domain::ports::document_store::DocumentStore;
use crate::domain::ports::embedding_port::{EmbeddingFunction, InputType};
use crate::domain::ports::similarity_index::SimilarityIndex;
use crate::domain::values::similarity::ScoredId;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub struct SearchUseCase {
    store: Arc<dyn DocumentStore>,
    index: Arc<dyn SimilarityIndex>,
    embedder: Arc<dyn EmbeddingFunction>,
    embedding_timeout: Duration,
    preview_chars: usize,
}

impl SearchUseCase {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        index: Arc<dyn SimilarityIndex>,
        embedder: Arc<dyn EmbeddingFunction>,
        embedding_timeout: Duration,
        preview_chars: usize,
    ) -> Self {
        Self {
            store,
            index,
            embedder,
            embedding_timeout,
            preview_chars,
        }
    }

    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>, DomainError> {
        if query.trim().is_empty() {
            return Err(DomainError::EmptyQuery);
        }

        let vector = embed_one_with_timeout(
            self.embedder.as_ref(),
            query,
            InputType::Query,
            self.embedding_timeout,
        )
        .await?;
        if vector.is_empty() {
            debug!(embedder = self.embedder.name(), "query produced no embedding");
            return Ok(vec![]);
        }

        let ranked = self.index.query(&vector, k)?;
        self.enrich(ranked)
    }

    /// Nearest neighbours of a raw vector, without enrichment.
    pub fn query_vector(&self, vector: &[f64], k: usize) -> Result<Vec<ScoredId>, DomainError> {
        self.index.query(vector, k)
    }

    // Hits whose record was deleted after ranking are dropped.
    fn enrich(&self, ranked: Vec<ScoredId>) -> Result<Vec<SearchHit>, DomainError> {
        let mut hits = Vec::with_capacity(ranked.len());
        for ScoredId { id, score } in ranked {
            match self.store.get(&id)? {
                Some(record) => hits.push(SearchHit {
                    text_preview: record.text_preview(self.preview_chars),
                    metadata: record.metadata,
                    id,
                    score,
                }),
                None => debug!(%id, "ranked record vanished before enrichment"),
            }
        }
        Ok(hits)
    }
}
