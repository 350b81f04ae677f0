use crate::domain::entities::vector_record::VectorRecord;
use crate::domain::error::DomainError;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Lazily decoded, snapshot-consistent sequence of records.
pub type RecordIter = Box<dyn Iterator<Item = VectorRecord> + Send>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoreStats {
    pub total_records: usize,
    pub embedded_records: usize,
    pub empty_records: usize,
    pub failed_records: usize,
    pub dimension: Option<usize>,
}

/// Durable keyed collection of [`VectorRecord`]s. The only writer of the
/// persisted collection.
pub trait DocumentStore: Send + Sync {
    /// Insert or fully replace the record under `record.id`, generating an
    /// id when it is empty. Fails with `DimensionMismatch` when a non-empty
    /// vector disagrees with the established dimension. Durable on return.
    fn upsert(&self, record: VectorRecord) -> Result<String, DomainError>;

    fn get(&self, id: &str) -> Result<Option<VectorRecord>, DomainError>;

    /// Every record as of the moment of the call.
    fn all_records(&self) -> Result<RecordIter, DomainError>;

    /// `true` if a record existed and was removed.
    fn delete(&self, id: &str) -> Result<bool, DomainError>;

    /// Fixed by the first non-empty upsert, `None` until then.
    fn dimension(&self) -> Result<Option<usize>, DomainError>;

    fn stats(&self) -> Result<StoreStats, DomainError>;

    /// Records with non-blank text that do not carry a vector yet.
    fn records_needing_embedding(&self) -> Result<Vec<VectorRecord>, DomainError>;

    /// Attach `vector` to record `id` only if it is still unembedded and was
    /// last written at `expected_updated_at`. Returns `false`, writing
    /// nothing, when the record was deleted or replaced in the meantime.
    /// Dimension rules are those of `upsert`.
    fn set_vector_if_unchanged(
        &self,
        id: &str,
        expected_updated_at: DateTime<Utc>,
        vector: Vec<f64>,
    ) -> Result<bool, DomainError>;
}
