//! In-memory vector store — per-user partitions in process memory.
//!
//! Useful for testing and ephemeral deployments. Partitions are created
//! lazily on first insert; a query against a missing partition is the
//! normal "no memory yet" case and returns empty.

use async_trait::async_trait;
use chrono::Utc;
use memoclaw_core::error::MemoryError;
use memoclaw_core::memory::{Embedder, InsertOutcome, MemoryRecord, RecordMetadata, VectorMemory};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::vector::rank_by_similarity;

/// An in-process vector store partitioned by owner id.
pub struct InMemoryVectorStore {
    partitions: RwLock<HashMap<String, Vec<MemoryRecord>>>,
    embedder: Arc<dyn Embedder>,
}

impl InMemoryVectorStore {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            partitions: RwLock::new(HashMap::new()),
            embedder,
        }
    }
}

#[async_trait]
impl VectorMemory for InMemoryVectorStore {
    fn name(&self) -> &str {
        "in_memory"
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

        let record = MemoryRecord {
            id: Uuid::new_v4().to_string(),
            owner_id: owner.to_string(),
            text: text.to_string(),
            embedding,
            metadata,
            created_at: Utc::now(),
        };
        let id = record.id.clone();

        self.partitions
            .write()
            .await
            .entry(owner.to_string())
            .or_default()
            .push(record);

        debug!(owner, id = %id, "Stored memory record");
        InsertOutcome::Inserted { id }
    }

    async fn query(&self, owner: &str, text: &str, k: usize) -> Vec<String> {
        let query_embedding = match self.embedder.embed(text).await {
            Ok(v) => v,
            Err(e) => {
                warn!(owner, "Memory query failed to embed: {e}");
                return Vec::new();
            }
        };

        let partitions = self.partitions.read().await;
        let Some(records) = partitions.get(owner) else {
            // Expected for users with no history yet.
            debug!(owner, "No memory partition yet");
            return Vec::new();
        };

        rank_by_similarity(records, &query_embedding, k)
            .into_iter()
            .map(|r| r.text.clone())
            .collect()
    }

    async fn count(&self, owner: &str) -> Result<usize, MemoryError> {
        Ok(self
            .partitions
            .read()
            .await
            .get(owner)
            .map_or(0, Vec::len))
    }
}
