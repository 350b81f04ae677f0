use crate::domain::error::DomainError;
use crate::domain::ports::document_store::{DocumentStore, StoreStats};
use crate::domain::ports::embedding_port::EmbeddingFunction;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    #[serde(flatten)]
    pub store: StoreStats,
    pub embedder: String,
    pub embedder_dimension: usize,
}

pub struct StatsUseCase {
    store: Arc<dyn DocumentStore>,
    embedder: Arc<dyn EmbeddingFunction>,
}

impl StatsUseCase {
    pub fn new(store: Arc<dyn DocumentStore>, embedder: Arc<dyn EmbeddingFunction>) -> Self {
        Self { store, embedder }
    }

    pub fn stats(&self) -> Result<StatsReport, DomainError> {
        Ok(StatsReport {
            store: self.store.stats()?,
            embedder: self.embedder.name().to_string(),
            embedder_dimension: self.embedder.dimension(),
        })
    }
}
