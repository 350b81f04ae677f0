use crate::domain::entities::vector_record::{Metadata, VectorRecord};
use crate::domain::error::DomainError;
use crate::domain::ports::document_store::{DocumentStore, RecordIter, StoreStats};
use crate::domain::values::embedding_status::EmbeddingStatus;
use crate::infrastructure::sqlite::migrations::run_migrations;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

const SELECT_COLS: &str = "id, text, vector, metadata, embedding_status, created_at, updated_at";
const DIMENSION_KEY: &str = "dimension";

/// A row as stored, decoded into a [`VectorRecord`] only when consumed.
struct RawRow {
    id: String,
    text: String,
    vector: Vec<u8>,
    metadata: String,
    embedding_status: String,
    created_at: String,
    updated_at: String,
}

impl RawRow {
    fn from_row(row: &rusqlite::Row) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get(0)?,
            text: row.get(1)?,
            vector: row.get(2)?,
            metadata: row.get(3)?,
            embedding_status: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn decode(self) -> Result<VectorRecord, DomainError> {
        let vector = deserialize_vector(&self.vector);
        let metadata: Metadata = serde_json::from_str(&self.metadata)
            .map_err(|e| DomainError::Parse(format!("metadata of '{}': {e}", self.id)))?;
        let embedding_status = self
            .embedding_status
            .parse::<EmbeddingStatus>()
            .map_err(|e| DomainError::Parse(format!("embedding_status of '{}': {e}", self.id)))?;
        let created_at = parse_timestamp(&self.id, "created_at", &self.created_at)?;
        let updated_at = parse_timestamp(&self.id, "updated_at", &self.updated_at)?;
        Ok(VectorRecord {
            id: self.id,
            text: self.text,
            vector,
            metadata,
            embedding_status,
            created_at,
            updated_at,
        })
    }

    /// Bulk reads skip rows that cannot be decoded rather than failing the
    /// whole scan.
    fn decode_or_skip(self) -> Option<VectorRecord> {
        let id = self.id.clone();
        match self.decode() {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(id = %id, error = %e, "skipping undecodable record");
                None
            }
        }
    }
}

fn parse_timestamp(id: &str, column: &str, s: &str) -> Result<DateTime<Utc>, DomainError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DomainError::Parse(format!("{column} of '{id}': {e}")))
}

fn serialize_vector(v: &[f64]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn deserialize_vector(bytes: &[u8]) -> Vec<f64> {
    bytes
        .chunks_exact(8)
        .map(|chunk| {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(chunk);
            f64::from_le_bytes(buf)
        })
        .collect()
}

/// [`DocumentStore`] backed by a single SQLite connection.
///
/// Every write runs in its own transaction under the connection mutex, so
/// upserts to one id are totally ordered and readers never see a partial
/// record. Reads copy the rows they need while holding the lock.
pub struct SqliteDocumentStore {
    conn: Mutex<Connection>,
}

impl SqliteDocumentStore {
    /// Open (or create) the database at `path`. `":memory:"` gives a
    /// private, non-durable store.
    pub fn open(path: &str) -> Result<Self, DomainError> {
        let conn = Connection::open(path).map_err(|e| DomainError::Database(format!("DB error: {e}")))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| DomainError::Database(format!("WAL error: {e}")))?;
        conn.pragma_update(None, "synchronous", "FULL")
            .map_err(|e| DomainError::Database(format!("synchronous error: {e}")))?;
        let store = Self::new(conn)?;
        info!(path, dimension = ?store.dimension()?, "document store opened");
        Ok(store)
    }

    pub fn new(conn: Connection) -> Result<Self, DomainError> {
        run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, DomainError> {
        self.conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))
    }

    fn read_dimension(conn: &Connection) -> Result<Option<usize>, DomainError> {
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM store_meta WHERE key = ?1",
                params![DIMENSION_KEY],
                |r| r.get(0),
            )
            .optional()?;
        value
            .map(|v| {
                v.parse::<usize>()
                    .map_err(|e| DomainError::Parse(format!("stored dimension '{v}': {e}")))
            })
            .transpose()
    }

    /// Checks `actual` against the established dimension, establishing it
    /// when the store has none yet.
    fn ensure_dimension(conn: &Connection, actual: usize) -> Result<(), DomainError> {
        match Self::read_dimension(conn)? {
            Some(expected) if expected != actual => Err(DomainError::DimensionMismatch { expected, actual }),
            Some(_) => Ok(()),
            None => {
                conn.execute(
                    "INSERT INTO store_meta (key, value) VALUES (?1, ?2)",
                    params![DIMENSION_KEY, actual.to_string()],
                )?;
                info!(dimension = actual, "store dimension established");
                Ok(())
            }
        }
    }
}

fn check_finite(id: &str, vector: &[f64]) -> Result<(), DomainError> {
    if vector.iter().any(|x| !x.is_finite()) {
        return Err(DomainError::InvalidInput(format!(
            "vector for '{id}' contains non-finite components"
        )));
    }
    Ok(())
}

impl DocumentStore for SqliteDocumentStore {
    fn upsert(&self, mut record: VectorRecord) -> Result<String, DomainError> {
        if record.id.trim().is_empty() {
            record.id = uuid::Uuid::new_v4().to_string();
        }
        check_finite(&record.id, &record.vector)?;
        // Status must agree with the vector it describes.
        if record.is_scorable() {
            record.embedding_status = EmbeddingStatus::Embedded;
        } else if record.embedding_status == EmbeddingStatus::Embedded {
            record.embedding_status = EmbeddingStatus::Empty;
        }
        record.updated_at = Utc::now();

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        if record.is_scorable() {
            Self::ensure_dimension(&tx, record.dimension())?;
        }

        tx.execute(
            "INSERT INTO documents (id, text, vector, metadata, embedding_status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
                text = excluded.text,
                vector = excluded.vector,
                metadata = excluded.metadata,
                embedding_status = excluded.embedding_status,
                updated_at = excluded.updated_at",
            params![
                record.id,
                record.text,
                serialize_vector(&record.vector),
                serde_json::to_string(&record.metadata)?,
                record.embedding_status.to_string(),
                record.created_at.to_rfc3339(),
                record.updated_at.to_rfc3339(),
            ],
        )
        .map_err(|e| DomainError::Database(format!("Failed to upsert record: {e}")))?;
        tx.commit()?;

        debug!(id = %record.id, dimension = record.dimension(), status = %record.embedding_status, "record upserted");
        Ok(record.id)
    }

    fn get(&self, id: &str) -> Result<Option<VectorRecord>, DomainError> {
        let conn = self.lock()?;
        let sql = format!("SELECT {} FROM documents WHERE id = ?1", SELECT_COLS);
        let raw = conn
            .query_row(&sql, params![id], RawRow::from_row)
            .optional()?;
        raw.map(RawRow::decode).transpose()
    }

    fn all_records(&self) -> Result<RecordIter, DomainError> {
        let rows = {
            let conn = self.lock()?;
            let sql = format!("SELECT {} FROM documents ORDER BY id", SELECT_COLS);
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], RawRow::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };
        Ok(Box::new(rows.into_iter().filter_map(RawRow::decode_or_skip)))
    }

    fn delete(&self, id: &str) -> Result<bool, DomainError> {
        let conn = self.lock()?;
        let removed = conn
            .execute("DELETE FROM documents WHERE id = ?1", params![id])
            .map_err(|e| DomainError::Database(format!("Failed to delete record: {e}")))?;
        if removed > 0 {
            debug!(id, "record deleted");
        }
        Ok(removed > 0)
    }

    fn dimension(&self) -> Result<Option<usize>, DomainError> {
        let conn = self.lock()?;
        Self::read_dimension(&conn)
    }

    fn stats(&self) -> Result<StoreStats, DomainError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT embedding_status, COUNT(*) FROM documents GROUP BY embedding_status")?;
        let counts = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, usize>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stats = StoreStats {
            dimension: Self::read_dimension(&conn)?,
            ..StoreStats::default()
        };
        for (status, count) in counts {
            stats.total_records += count;
            match status.parse() {
                Ok(EmbeddingStatus::Embedded) => stats.embedded_records += count,
                Ok(EmbeddingStatus::Empty) => stats.empty_records += count,
                Ok(EmbeddingStatus::Failed) => stats.failed_records += count,
                Err(_) => warn!(status = %status, count, "records with unknown embedding_status"),
            }
        }
        Ok(stats)
    }

    fn records_needing_embedding(&self) -> Result<Vec<VectorRecord>, DomainError> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM documents WHERE embedding_status != 'embedded' AND TRIM(text) != '' ORDER BY id",
            SELECT_COLS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], RawRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows.into_iter().filter_map(RawRow::decode_or_skip).collect())
    }

    fn set_vector_if_unchanged(
        &self,
        id: &str,
        expected_updated_at: DateTime<Utc>,
        vector: Vec<f64>,
    ) -> Result<bool, DomainError> {
        if vector.is_empty() {
            return Err(DomainError::InvalidInput(format!("empty vector for '{id}'")));
        }
        check_finite(id, &vector)?;

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        Self::ensure_dimension(&tx, vector.len())?;

        let changed = tx
            .execute(
                "UPDATE documents SET vector = ?1, embedding_status = ?2, updated_at = ?3
                 WHERE id = ?4 AND updated_at = ?5 AND embedding_status != ?2",
                params![
                    serialize_vector(&vector),
                    EmbeddingStatus::Embedded.to_string(),
                    Utc::now().to_rfc3339(),
                    id,
                    expected_updated_at.to_rfc3339(),
                ],
            )
            .map_err(|e| DomainError::Database(format!("Failed to set vector: {e}")))?;
        if changed == 0 {
            // Deleted or rewritten since it was read; dropping the
            // transaction also undoes a dimension established above.
            debug!(id, "record changed underneath, vector not applied");
            return Ok(false);
        }
        tx.commit()?;

        debug!(id, dimension = vector.len(), "vector applied");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_blob_round_trip_is_bit_exact() {
        let v = vec![0.1, -2.5e-300, f64::MAX, 0.0, -0.0];
        let decoded = deserialize_vector(&serialize_vector(&v));
        assert_eq!(v.len(), decoded.len());
        for (a, b) in v.iter().zip(decoded.iter()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    fn store_with_raw_row(metadata: &str, created_at: &str) -> SqliteDocumentStore {
        let store = SqliteDocumentStore::new(Connection::open_in_memory().unwrap()).unwrap();
        store
            .lock()
            .unwrap()
            .execute(
                "INSERT INTO documents (id, text, vector, metadata, embedding_status, created_at, updated_at)
                 VALUES ('bad', 'corrupt row', X'', ?1, 'failed', ?2, '2026-01-01T00:00:00+00:00')",
                params![metadata, created_at],
            )
            .unwrap();
        store
    }

    #[test]
    fn test_corrupt_metadata_is_a_parse_error() {
        let store = store_with_raw_row("{not json", "2026-01-01T00:00:00+00:00");
        assert!(matches!(store.get("bad"), Err(DomainError::Parse(_))));
    }

    #[test]
    fn test_corrupt_timestamp_is_not_replaced_with_now() {
        let store = store_with_raw_row("{}", "yesterday-ish");
        assert!(matches!(store.get("bad"), Err(DomainError::Parse(_))));
    }

    #[test]
    fn test_bulk_reads_skip_corrupt_rows() {
        let store = store_with_raw_row("{not json", "2026-01-01T00:00:00+00:00");
        store
            .upsert(VectorRecord::failed("good", "retry me", Metadata::new()))
            .unwrap();

        let ids: Vec<String> = store.all_records().unwrap().map(|r| r.id).collect();
        assert_eq!(ids, vec!["good".to_string()]);
        let pending: Vec<String> = store
            .records_needing_embedding()
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(pending, vec!["good".to_string()]);
    }

    #[test]
    fn test_truncated_blob_drops_partial_component() {
        let mut bytes = serialize_vector(&[1.0, 2.0]);
        bytes.pop();
        assert_eq!(deserialize_vector(&bytes), vec![1.0]);
    }
}
