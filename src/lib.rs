pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

use crate::application::add_document::AddDocumentUseCase;
use crate::application::documents::DocumentsUseCase;
use crate::application::reindex::ReindexUseCase;
use crate::application::search::SearchUseCase;
use crate::application::stats::{StatsReport, StatsUseCase};
use crate::config::{Config, EmbeddingConfig, EmbeddingProviderKind, ServiceOptions};
use crate::domain::entities::search_hit::SearchHit;
use crate::domain::entities::vector_record::{Metadata, VectorRecord};
use crate::domain::error::DomainError;
use crate::domain::ports::document_store::DocumentStore;
use crate::domain::ports::embedding_port::EmbeddingFunction;
use crate::domain::ports::similarity_index::SimilarityIndex;
use crate::domain::values::similarity::ScoredId;
use crate::infrastructure::embeddings::char_stats::CharStatsEmbedder;
use crate::infrastructure::embeddings::hashing::HashingEmbedder;
use crate::infrastructure::embeddings::noop::NoopEmbedder;
use crate::infrastructure::embeddings::openai::OpenAiEmbedder;
use crate::infrastructure::index::brute_force::BruteForceIndex;
use crate::infrastructure::sqlite::document_store::SqliteDocumentStore;
use std::sync::Arc;
use tracing::warn;

/// Registers documents and answers similarity queries over them.
pub struct SearchService {
    add_document_uc: AddDocumentUseCase,
    search_uc: SearchUseCase,
    documents_uc: DocumentsUseCase,
    reindex_uc: ReindexUseCase,
    stats_uc: StatsUseCase,
}

impl SearchService {
    pub fn open(config: &Config) -> Result<Self, DomainError> {
        let embedder = build_embedder(&config.embedding)?;
        let store: Arc<dyn DocumentStore> = Arc::new(SqliteDocumentStore::open(&config.db_path)?);
        Self::with_store(store, embedder, config.service.clone())
    }

    pub fn with_providers(db_path: &str, embedder: Arc<dyn EmbeddingFunction>) -> Result<Self, DomainError> {
        let store: Arc<dyn DocumentStore> = Arc::new(SqliteDocumentStore::open(db_path)?);
        Self::with_store(store, embedder, ServiceOptions::default())
    }

    /// Wires the default brute-force index over `store`.
    pub fn with_store(
        store: Arc<dyn DocumentStore>,
        embedder: Arc<dyn EmbeddingFunction>,
        options: ServiceOptions,
    ) -> Result<Self, DomainError> {
        let index: Arc<dyn SimilarityIndex> = Arc::new(BruteForceIndex::new(store.clone()));

        let provider_dim = embedder.dimension();
        if provider_dim > 0 {
            if let Some(stored_dim) = store.dimension()? {
                if stored_dim != provider_dim {
                    warn!(
                        stored_dim,
                        provider_dim,
                        embedder = embedder.name(),
                        "stored vectors disagree with the embedding provider; new documents will be rejected until the store is rebuilt"
                    );
                }
            }
        }

        Ok(Self::with_components(store, index, embedder, options))
    }

    pub fn with_components(
        store: Arc<dyn DocumentStore>,
        index: Arc<dyn SimilarityIndex>,
        embedder: Arc<dyn EmbeddingFunction>,
        options: ServiceOptions,
    ) -> Self {
        Self {
            add_document_uc: AddDocumentUseCase::new(store.clone(), embedder.clone(), options.embedding_timeout),
            search_uc: SearchUseCase::new(
                store.clone(),
                index,
                embedder.clone(),
                options.embedding_timeout,
                options.preview_chars,
            ),
            documents_uc: DocumentsUseCase::new(store.clone()),
            reindex_uc: ReindexUseCase::new(store.clone(), embedder.clone(), options.embedding_timeout),
            stats_uc: StatsUseCase::new(store, embedder),
        }
    }

    // Delegating methods
    pub async fn add_document(&self, text: String, metadata: Metadata) -> Result<String, DomainError> {
        self.add_document_uc.execute(None, text, metadata).await
    }

    pub async fn add_document_with_id(
        &self,
        id: Option<String>,
        text: String,
        metadata: Metadata,
    ) -> Result<String, DomainError> {
        self.add_document_uc.execute(id, text, metadata).await
    }

    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>, DomainError> {
        self.search_uc.search(query, k).await
    }

    pub fn query_vector(&self, vector: &[f64], k: usize) -> Result<Vec<ScoredId>, DomainError> {
        self.search_uc.query_vector(vector, k)
    }

    pub fn get_document(&self, id: &str) -> Result<Option<VectorRecord>, DomainError> {
        self.documents_uc.get(id)
    }

    pub fn delete_document(&self, id: &str) -> Result<bool, DomainError> {
        self.documents_uc.delete(id)
    }

    pub fn list_documents(&self) -> Result<Vec<VectorRecord>, DomainError> {
        self.documents_uc.all()
    }

    pub fn stats(&self) -> Result<StatsReport, DomainError> {
        self.stats_uc.stats()
    }

    pub async fn reindex(&self) -> Result<usize, DomainError> {
        self.reindex_uc.execute().await
    }
}

pub fn build_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingFunction>, DomainError> {
    let embedder: Arc<dyn EmbeddingFunction> = match config.provider {
        EmbeddingProviderKind::Hashing => Arc::new(HashingEmbedder::new(config.dimension)?),
        EmbeddingProviderKind::CharStats => Arc::new(CharStatsEmbedder),
        EmbeddingProviderKind::OpenAi => {
            if config.api_key.is_empty() {
                warn!("openai embedder configured without an API key; documents will be stored unembedded");
            }
            Arc::new(OpenAiEmbedder::new(
                config.api_key.clone(),
                config.model.clone(),
                config.base_url.clone(),
            ))
        }
        EmbeddingProviderKind::Noop => Arc::new(NoopEmbedder),
    };
    Ok(embedder)
}
