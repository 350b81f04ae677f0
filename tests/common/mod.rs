//! Shared test helpers.
#![allow(dead_code)]

use docvault::config::ServiceOptions;
use docvault::domain::entities::vector_record::{Metadata, VectorRecord};
use docvault::domain::error::DomainError;
use docvault::domain::ports::embedding_port::{EmbeddingFunction, InputType};
use docvault::infrastructure::embeddings::hashing::HashingEmbedder;
use docvault::infrastructure::sqlite::document_store::SqliteDocumentStore;
use docvault::SearchService;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

pub fn setup() -> SearchService {
    SearchService::with_providers(":memory:", Arc::new(HashingEmbedder::default())).unwrap()
}

pub fn setup_with(embedder: Arc<dyn EmbeddingFunction>) -> SearchService {
    SearchService::with_providers(":memory:", embedder).unwrap()
}

pub fn setup_with_options(embedder: Arc<dyn EmbeddingFunction>, options: ServiceOptions) -> SearchService {
    let store = Arc::new(SqliteDocumentStore::open(":memory:").unwrap());
    SearchService::with_store(store, embedder, options).unwrap()
}

pub fn memory_store() -> SqliteDocumentStore {
    SqliteDocumentStore::open(":memory:").unwrap()
}

pub fn record(id: &str, text: &str, vector: Vec<f64>) -> VectorRecord {
    VectorRecord::new(id, text, vector, Metadata::new())
}

pub fn meta(pairs: &[(&str, &str)]) -> Metadata {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
        .collect()
}

/// Maps known texts to fixed vectors; unknown non-empty text is unavailable.
pub struct StubEmbedder {
    vectors: HashMap<String, Vec<f64>>,
    dimension: usize,
}

impl StubEmbedder {
    pub fn new(pairs: &[(&str, Vec<f64>)]) -> Self {
        let dimension = pairs.first().map(|(_, v)| v.len()).unwrap_or(0);
        Self {
            vectors: pairs
                .iter()
                .map(|(text, v)| (text.to_string(), v.clone()))
                .collect(),
            dimension,
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingFunction for StubEmbedder {
    async fn embed_many(&self, texts: &[String], _input_type: InputType) -> Result<Vec<Vec<f64>>, DomainError> {
        texts
            .iter()
            .map(|t| {
                if t.is_empty() {
                    return Ok(vec![]);
                }
                self.vectors
                    .get(t)
                    .cloned()
                    .ok_or_else(|| DomainError::EmbeddingUnavailable(format!("no stub vector for '{t}'")))
            })
            .collect()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// Delegates to the hashing embedder while healthy, fails otherwise.
pub struct FlakyEmbedder {
    pub healthy: AtomicBool,
    inner: HashingEmbedder,
}

impl FlakyEmbedder {
    pub fn new(healthy: bool) -> Self {
        Self {
            healthy: AtomicBool::new(healthy),
            inner: HashingEmbedder::default(),
        }
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl EmbeddingFunction for FlakyEmbedder {
    async fn embed_many(&self, texts: &[String], input_type: InputType) -> Result<Vec<Vec<f64>>, DomainError> {
        if !self.healthy.load(Ordering::SeqCst) {
            return Err(DomainError::EmbeddingUnavailable("backend down".into()));
        }
        self.inner.embed_many(texts, input_type).await
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn name(&self) -> &str {
        "flaky"
    }
}

/// Never answers within any reasonable deadline.
pub struct SlowEmbedder {
    pub delay: Duration,
}

#[async_trait::async_trait]
impl EmbeddingFunction for SlowEmbedder {
    async fn embed_many(&self, texts: &[String], _input_type: InputType) -> Result<Vec<Vec<f64>>, DomainError> {
        tokio::time::sleep(self.delay).await;
        Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
    }

    fn dimension(&self) -> usize {
        2
    }

    fn name(&self) -> &str {
        "slow"
    }
}

/// Hashing embedder that signals when a batch arrives and then holds it
/// until released, so a test can act while embedding is in flight.
pub struct GatedEmbedder {
    pub started: Notify,
    pub release: Notify,
    inner: HashingEmbedder,
}

impl GatedEmbedder {
    pub fn new() -> Self {
        Self {
            started: Notify::new(),
            release: Notify::new(),
            inner: HashingEmbedder::default(),
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingFunction for GatedEmbedder {
    async fn embed_many(&self, texts: &[String], input_type: InputType) -> Result<Vec<Vec<f64>>, DomainError> {
        self.started.notify_one();
        self.release.notified().await;
        self.inner.embed_many(texts, input_type).await
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn name(&self) -> &str {
        "gated"
    }
}
