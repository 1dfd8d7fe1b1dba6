//! No-op chat-history store — for deployments without a system of record.

use async_trait::async_trait;
use memoclaw_core::error::MemoryError;
use memoclaw_core::history::{ChatHistoryStore, PersistedMessage};

/// A history store that accepts every write and remembers nothing.
pub struct NoopHistoryStore;

#[async_trait]
impl ChatHistoryStore for NoopHistoryStore {
    async fn append(
        &self,
        _user_id: &str,
        _session_id: &str,
        _sender: &str,
        _text: &str,
    ) -> Result<(), MemoryError> {
        Ok(())
    }

    async fn list(&self, _user_id: &str) -> Result<Vec<PersistedMessage>, MemoryError> {
        Ok(Vec::new())
    }
}
