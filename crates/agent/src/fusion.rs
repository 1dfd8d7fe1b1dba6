//! Memory fusion — merge short-term and long-term recall into one context.
//!
//! Long-term memories are approximate (nearest-neighbour over embeddings)
//! and go into a demarcated context block prepended to the question.
//! Short-term history is exact (the session window) and travels alongside
//! the input as distinct conversation turns. When long-term memory has
//! nothing relevant, the input passes through byte-for-byte unchanged.

use memoclaw_core::memory::VectorMemory;
use memoclaw_core::turn::{SessionId, Turn, UserId};
use memoclaw_memory::SessionStore;
use std::sync::Arc;
use tracing::debug;

/// The fused prompt context for one request.
#[derive(Debug, Clone)]
pub struct FusedContext {
    /// The user input, with a context block prepended when memories hit.
    pub augmented_input: String,

    /// The session window's turns, chronological.
    pub history: Vec<Turn>,
}

/// Builds the fused context from both memory layers.
pub struct MemoryFusion {
    memory: Arc<dyn VectorMemory>,
    sessions: Arc<SessionStore>,
    recall_limit: usize,
}

impl MemoryFusion {
    pub fn new(
        memory: Arc<dyn VectorMemory>,
        sessions: Arc<SessionStore>,
        recall_limit: usize,
    ) -> Self {
        Self {
            memory,
            sessions,
            recall_limit,
        }
    }

    /// Assemble the context for one request.
    pub async fn build_context(
        &self,
        user: &UserId,
        session: &SessionId,
        input: &str,
    ) -> FusedContext {
        let memories = self
            .memory
            .query(user.as_str(), input, self.recall_limit)
            .await;

        let augmented_input = if memories.is_empty() {
            input.to_string()
        } else {
            debug!(user = %user, count = memories.len(), "Recalled long-term memories");
            format!(
                "Here is some relevant context from our past conversations:\n\
                 <CONTEXT>\n{}\n</CONTEXT>\n\n\
                 Now, please answer the following question:\n{}",
                memories.join("\n"),
                input
            )
        };

        let history = self.sessions.history(session.as_str()).await;

        FusedContext {
            augmented_input,
            history,
        }
    }
}
