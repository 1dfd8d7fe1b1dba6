//! Provider trait — the abstraction over LLM backends.
//!
//! A Provider knows how to turn a prompt plus conversation history into a
//! completion, and (optionally) how to embed text. The reasoning loop calls
//! `complete()` without knowing which backend is behind it.

use crate::error::ProviderError;
use crate::turn::Turn;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A request for one completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// System instructions (persona, tool roster, output format)
    pub system: String,

    /// Prior conversation turns, oldest first
    pub history: Vec<Turn>,

    /// The current input the model must respond to
    pub input: String,

    /// Temperature (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Stop sequences
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,
}

fn default_temperature() -> f32 {
    0.7
}

impl CompletionRequest {
    /// A bare request: no system prompt, no history.
    pub fn direct(input: impl Into<String>) -> Self {
        Self {
            system: String::new(),
            history: Vec::new(),
            input: input.into(),
            temperature: default_temperature(),
            max_tokens: None,
            stop: Vec::new(),
        }
    }
}

/// A completion returned by a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    /// The generated text
    pub text: String,

    /// Which model actually responded (may differ from requested)
    pub model: String,

    /// Token usage statistics, when the provider reports them
    pub usage: Option<Usage>,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core Provider trait.
///
/// Implementations: OpenAI-compatible HTTP APIs (Groq, OpenAI, OpenRouter)
/// and test doubles. Any failure is a `ProviderError`; the loop treats it
/// as an abort trigger for the fallback controller.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g. "groq", "openai").
    fn name(&self) -> &str;

    /// Produce one completion for the request.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<Completion, ProviderError>;

    /// Embed the given texts into fixed-length vectors, one per input.
    ///
    /// Deterministic for identical input. Default implementation reports
    /// that this provider has no embedding support.
    async fn embed(
        &self,
        _texts: &[String],
    ) -> std::result::Result<Vec<Vec<f32>>, ProviderError> {
        Err(ProviderError::NotConfigured(format!(
            "Provider '{}' does not support embeddings",
            self.name()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_request_has_no_context() {
        let req = CompletionRequest::direct("hello");
        assert!(req.system.is_empty());
        assert!(req.history.is_empty());
        assert_eq!(req.input, "hello");
        assert!((req.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn completion_serialization() {
        let completion = Completion {
            text: "42".into(),
            model: "test-model".into(),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 2,
                total_tokens: 12,
            }),
        };
        let json = serde_json::to_string(&completion).unwrap();
        assert!(json.contains("test-model"));
        assert!(json.contains("\"total_tokens\":12"));
    }
}
