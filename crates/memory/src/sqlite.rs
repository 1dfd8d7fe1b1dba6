//! SQLite vector store — durable per-user memory.
//!
//! One `memories` table keyed by owner; embeddings are stored as
//! little-endian f32 blobs and ranked in process. Similarity search over a
//! single user's records is small enough that loading the partition and
//! scoring it in memory beats maintaining an index.

use async_trait::async_trait;
use chrono::Utc;
use memoclaw_core::error::MemoryError;
use memoclaw_core::memory::{Embedder, InsertOutcome, MemoryRecord, RecordMetadata, VectorMemory};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::vector::rank_by_similarity;

/// A durable SQLite-backed vector store.
pub struct SqliteVectorStore {
    pool: SqlitePool,
    embedder: Arc<dyn Embedder>,
}

impl SqliteVectorStore {
    /// Create a new SQLite store from a file path.
    ///
    /// The database and table are created automatically.
    /// Pass `":memory:"` for an in-process ephemeral database (useful for tests).
    pub async fn new(path: &str, embedder: Arc<dyn Embedder>) -> Result<Self, MemoryError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| MemoryError::Storage(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        // An in-memory database exists per connection; more than one pool
        // connection would see different databases.
        let max_connections = if path.contains(":memory:") { 1 } else { 4 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| MemoryError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool, embedder };
        store.run_migrations().await?;
        info!("SQLite memory store initialized at {path}");
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), MemoryError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS memories (
                id         TEXT PRIMARY KEY,
                owner_id   TEXT NOT NULL,
                content    TEXT NOT NULL,
                embedding  BLOB NOT NULL,
                sender     TEXT NOT NULL,
                session_id TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| MemoryError::MigrationFailed(format!("memories table: {e}")))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_memories_owner ON memories(owner_id)")
            .execute(&self.pool)
            .await
            .map_err(|e| MemoryError::MigrationFailed(format!("owner index: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }

    /// Serialize an embedding vector to bytes.
    fn embedding_to_blob(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize an embedding blob back to a vector.
    fn blob_to_embedding(blob: &[u8]) -> Vec<f32> {
        blob.chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    /// Load all records in an owner's partition, insertion order.
    async fn load_partition(&self, owner: &str) -> Result<Vec<MemoryRecord>, MemoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, content, embedding, sender, session_id, created_at
            FROM memories WHERE owner_id = ?1 ORDER BY rowid
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| MemoryError::QueryFailed(e.to_string()))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let blob: Vec<u8> = row
                .try_get("embedding")
                .map_err(|e| MemoryError::QueryFailed(format!("embedding column: {e}")))?;
            let created_at_str: String = row
                .try_get("created_at")
                .map_err(|e| MemoryError::QueryFailed(format!("created_at column: {e}")))?;
            let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_str)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now());

            records.push(MemoryRecord {
                id: row
                    .try_get("id")
                    .map_err(|e| MemoryError::QueryFailed(format!("id column: {e}")))?,
                owner_id: row
                    .try_get("owner_id")
                    .map_err(|e| MemoryError::QueryFailed(format!("owner_id column: {e}")))?,
                text: row
                    .try_get("content")
                    .map_err(|e| MemoryError::QueryFailed(format!("content column: {e}")))?,
                embedding: Self::blob_to_embedding(&blob),
                metadata: RecordMetadata::new(
                    row.try_get::<String, _>("sender")
                        .map_err(|e| MemoryError::QueryFailed(format!("sender column: {e}")))?,
                    row.try_get::<String, _>("session_id")
                        .map_err(|e| MemoryError::QueryFailed(format!("session_id column: {e}")))?,
                ),
                created_at,
            });
        }
        Ok(records)
    }
}

#[async_trait]
impl VectorMemory for SqliteVectorStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn insert(&self, owner: &str, text: &str, metadata: RecordMetadata) -> InsertOutcome {
        let embedding = match self.embedder.embed(text).await {
            Ok(v) => v,
            Err(e) => {
                warn!(owner, "Memory insert failed: {e}");
                return InsertOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        let id = Uuid::new_v4().to_string();
        let result = sqlx::query(
            r#"
            INSERT INTO memories (id, owner_id, content, embedding, sender, session_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&id)
        .bind(owner)
        .bind(text)
        .bind(Self::embedding_to_blob(&embedding))
        .bind(&metadata.sender)
        .bind(&metadata.session_id)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                debug!(owner, id = %id, "Stored memory record");
                InsertOutcome::Inserted { id }
            }
            Err(e) => {
                warn!(owner, "Memory insert failed: {e}");
                InsertOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn query(&self, owner: &str, text: &str, k: usize) -> Vec<String> {
        let query_embedding = match self.embedder.embed(text).await {
            Ok(v) => v,
            Err(e) => {
                warn!(owner, "Memory query failed to embed: {e}");
                return Vec::new();
            }
        };

        let records = match self.load_partition(owner).await {
            Ok(r) => r,
            Err(e) => {
                warn!(owner, "Memory query failed: {e}");
                return Vec::new();
            }
        };

        if records.is_empty() {
            // Expected for users with no history yet.
            debug!(owner, "No memory partition yet");
            return Vec::new();
        }

        rank_by_similarity(&records, &query_embedding, k)
            .into_iter()
            .map(|r| r.text.clone())
            .collect()
    }

    async fn count(&self, owner: &str) -> Result<usize, MemoryError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM memories WHERE owner_id = ?1")
            .bind(owner)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| MemoryError::QueryFailed(e.to_string()))?;
        let n: i64 = row
            .try_get("n")
            .map_err(|e| MemoryError::QueryFailed(e.to_string()))?;
        Ok(n as usize)
    }
}
