//! Memory system implementations for memoclaw.
//!
//! Two layers with different shapes:
//! - short-term: bounded per-session windows of recent exchanges
//!   ([`SessionStore`])
//! - long-term: per-user embedded records with nearest-neighbour recall
//!   ([`InMemoryVectorStore`], [`SqliteVectorStore`])

pub mod hash_embedder;
pub mod in_memory;
pub mod noop_history;
pub mod session;
pub mod vector;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use hash_embedder::HashEmbedder;
pub use in_memory::InMemoryVectorStore;
pub use noop_history::NoopHistoryStore;
pub use session::SessionStore;
pub use vector::{cosine_similarity, rank_by_similarity};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteVectorStore;
