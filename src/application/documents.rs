use crate::domain::entities::vector_record::VectorRecord;
use crate::domain::error::DomainError;
use crate::domain::ports::document_store::DocumentStore;
use std::sync::Arc;
use tracing::info;

pub struct DocumentsUseCase {
    store: Arc<dyn DocumentStore>,
}

impl DocumentsUseCase {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn get(&self, id: &str) -> Result<Option<VectorRecord>, DomainError> {
        self.store.get(id)
    }

    pub fn delete(&self, id: &str) -> Result<bool, DomainError> {
        let removed = self.store.delete(id)?;
        if removed {
            info!(id, "document deleted");
        }
        Ok(removed)
    }

    pub fn all(&self) -> Result<Vec<VectorRecord>, DomainError> {
        Ok(self.store.all_records()?.collect())
    }
}
