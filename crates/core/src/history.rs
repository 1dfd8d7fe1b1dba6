//! Chat-history store — boundary contract for the external system of record.
//!
//! The durable transcript store lives outside this runtime (the original
//! deployment kept it in a hosted document database). The surrounding layer
//! calls `append` around each exchange; the core never reads it back for
//! reasoning — short-term recall comes from the session window and
//! long-term recall from the vector memory.

use crate::error::MemoryError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One persisted transcript message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedMessage {
    pub session_id: String,
    pub sender: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// The system-of-record contract.
#[async_trait]
pub trait ChatHistoryStore: Send + Sync {
    /// Append one message to a user's transcript.
    async fn append(
        &self,
        user_id: &str,
        session_id: &str,
        sender: &str,
        text: &str,
    ) -> std::result::Result<(), MemoryError>;

    /// All persisted messages for a user, oldest first.
    async fn list(
        &self,
        user_id: &str,
    ) -> std::result::Result<Vec<PersistedMessage>, MemoryError>;
}
