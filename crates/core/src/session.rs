//! Short-term session memory — a bounded window of recent exchanges.
//!
//! The window holds whole exchanges, never half of one: eviction drops the
//! oldest user/agent pair together. Its contents become the conversation
//! history section of the prompt, oldest retained exchange first.

use crate::turn::{Exchange, Turn};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of exchanges a window retains.
pub const DEFAULT_WINDOW_EXCHANGES: usize = 5;

/// A ring of the most recent exchanges for one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionWindow {
    exchanges: VecDeque<Exchange>,
    capacity: usize,
}

impl SessionWindow {
    /// Create an empty window retaining at most `capacity` exchanges.
    /// A zero capacity is clamped to one so the window is never useless.
    pub fn new(capacity: usize) -> Self {
        Self {
            exchanges: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Append one completed exchange, dropping the oldest if full.
    pub fn push(&mut self, exchange: Exchange) {
        if self.exchanges.len() == self.capacity {
            self.exchanges.pop_front();
        }
        self.exchanges.push_back(exchange);
    }

    /// The retained exchanges, oldest first.
    pub fn exchanges(&self) -> impl Iterator<Item = &Exchange> {
        self.exchanges.iter()
    }

    /// The retained turns flattened chronologically (user, agent, user, …).
    pub fn turns(&self) -> Vec<Turn> {
        self.exchanges
            .iter()
            .flat_map(|e| [e.user.clone(), e.agent.clone()])
            .collect()
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for SessionWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_EXCHANGES)
    }
}
