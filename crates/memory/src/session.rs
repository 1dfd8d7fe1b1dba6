//! Session store — bounded LRU cache of per-session windows.
//!
//! The original design here was an unbounded process-wide map; this store
//! caps the number of live sessions and evicts the least-recently-touched
//! window on overflow. The map lock is held only for lookup/insert/touch;
//! each window sits behind its own Mutex, so appends for the same session
//! serialize while different sessions never contend.

use memoclaw_core::session::SessionWindow;
use memoclaw_core::turn::{Exchange, Turn};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Default maximum number of live sessions.
pub const DEFAULT_SESSION_CAPACITY: usize = 1024;

struct SessionEntry {
    window: Arc<Mutex<SessionWindow>>,
    /// Monotonic touch stamp for LRU eviction.
    last_used: u64,
}

/// A bounded cache of session id → window.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionEntry>>,
    clock: std::sync::atomic::AtomicU64,
    capacity: usize,
    window_exchanges: usize,
}

impl SessionStore {
    /// Create a store holding at most `capacity` sessions, each retaining
    /// `window_exchanges` exchanges.
    pub fn new(capacity: usize, window_exchanges: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            clock: std::sync::atomic::AtomicU64::new(0),
            capacity: capacity.max(1),
            window_exchanges,
        }
    }

    fn tick(&self) -> u64 {
        self.clock
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed)
    }

    /// Get the window for a session, creating an empty one if absent.
    ///
    /// Creating may evict the least-recently-used session when the store
    /// is at capacity.
    pub async fn get(&self, session_id: &str) -> Arc<Mutex<SessionWindow>> {
        let stamp = self.tick();
        let mut sessions = self.sessions.write().await;

        if let Some(entry) = sessions.get_mut(session_id) {
            entry.last_used = stamp;
            return entry.window.clone();
        }

        if sessions.len() >= self.capacity {
            // Evict the least-recently-touched session.
            if let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, e)| e.last_used)
                .map(|(id, _)| id.clone())
            {
                sessions.remove(&oldest);
                debug!(session_id = %oldest, "Evicted least-recently-used session window");
            }
        }

        let window = Arc::new(Mutex::new(SessionWindow::new(self.window_exchanges)));
        sessions.insert(
            session_id.to_string(),
            SessionEntry {
                window: window.clone(),
                last_used: stamp,
            },
        );
        window
    }

    /// Append one completed exchange to a session's window.
    pub async fn append(&self, session_id: &str, exchange: Exchange) {
        let window = self.get(session_id).await;
        window.lock().await.push(exchange);
    }

    /// The session's retained turns, chronological. Creates the window if
    /// absent (read-or-create, matching `get`).
    pub async fn history(&self, session_id: &str) -> Vec<Turn> {
        let window = self.get(session_id).await;
        let turns = window.lock().await.turns();
        turns
    }

    /// Drop a session's window. Returns whether it existed.
    pub async fn evict(&self, session_id: &str) -> bool {
        self.sessions.write().await.remove(session_id).is_some()
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(
            DEFAULT_SESSION_CAPACITY,
            memoclaw_core::session::DEFAULT_WINDOW_EXCHANGES,
        )
    }
}
