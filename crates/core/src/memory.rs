//! Long-term memory traits — per-user semantic recall over embeddings.
//!
//! Every persisted turn becomes one `MemoryRecord` in the owner's
//! partition. Partitions are strictly disjoint: a query against one user's
//! partition never sees another user's records.
//!
//! Inserts are best-effort by design — a memory write must never fail the
//! conversation that triggered it. The outcome is still typed
//! (`Inserted` / `Failed`) so callers and tests can observe the failure
//! path without scraping logs.

use crate::error::MemoryError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default number of memories retrieved per query.
pub const DEFAULT_RECALL_LIMIT: usize = 3;

/// Metadata carried alongside a persisted memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Who produced the text ("user" / "agent")
    pub sender: String,

    /// The session the turn belonged to
    pub session_id: String,
}

impl RecordMetadata {
    pub fn new(sender: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            session_id: session_id.into(),
        }
    }
}

/// One embedded, persisted unit of long-term memory. Immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Unique record id
    pub id: String,

    /// Which user's partition this record belongs to
    pub owner_id: String,

    /// The original text
    pub text: String,

    /// Fixed-length embedding of `text`
    #[serde(skip)]
    pub embedding: Vec<f32>,

    /// Sender + session metadata
    pub metadata: RecordMetadata,

    /// When this record was created
    pub created_at: DateTime<Utc>,
}

/// The typed result of a best-effort insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The record was stored under this id.
    Inserted { id: String },

    /// The record was not stored; the reason is for logs and tests only —
    /// the caller's flow continues regardless.
    Failed { reason: String },
}

impl InsertOutcome {
    pub fn is_inserted(&self) -> bool {
        matches!(self, InsertOutcome::Inserted { .. })
    }
}

/// Per-user vector memory: insert and k-nearest-neighbour query.
///
/// Implementations: in-memory (tests, ephemeral sessions) and SQLite
/// (durable). Both partition records by owner and rank by similarity with
/// a deterministic, stable ordering.
#[async_trait]
pub trait VectorMemory: Send + Sync {
    /// The backend name (e.g. "in_memory", "sqlite").
    fn name(&self) -> &str;

    /// Embed `text` and append a record to the owner's partition, creating
    /// the partition on first insert. Never fails the caller — errors come
    /// back as `InsertOutcome::Failed`.
    async fn insert(&self, owner: &str, text: &str, metadata: RecordMetadata) -> InsertOutcome;

    /// Return the `k` most similar stored texts, most similar first.
    ///
    /// A missing partition ("no memory yet") and a storage failure both
    /// yield an empty vec; they are distinguished only in logs.
    async fn query(&self, owner: &str, text: &str, k: usize) -> Vec<String>;

    /// Number of records in the owner's partition (diagnostics and tests).
    async fn count(&self, owner: &str) -> std::result::Result<usize, MemoryError>;
}

/// Text → fixed-length vector. Deterministic for identical input.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// The embedder name (e.g. "feature_hash", "openai").
    fn name(&self) -> &str;

    /// The dimension of every vector this embedder produces.
    fn dimension(&self) -> usize;

    async fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, MemoryError>;
}
