//! The memoclaw reasoning core.
//!
//! `Assistant` is the facade: it fuses the two memory layers into a prompt
//! context, runs the bounded think→act→observe loop over the tool registry,
//! and degrades through the fallback controller when the loop cannot
//! answer. The pieces are usable on their own — the executor, parser, and
//! fusion have no knowledge of each other beyond their inputs.

pub mod executor;
pub mod fallback;
pub mod fusion;
pub mod parser;
pub mod prompt;
pub mod scratchpad;
pub mod service;

pub use executor::{AgentExecutor, LoopFailure, LoopOutcome};
pub use fallback::{DEGRADED_MESSAGE, FallbackController};
pub use fusion::{FusedContext, MemoryFusion};
pub use parser::{AgentAction, ParseError, ParsedReply};
pub use scratchpad::{AgentStep, Scratchpad};
pub use service::{Assistant, AssistantSettings, ChatOutcome};
