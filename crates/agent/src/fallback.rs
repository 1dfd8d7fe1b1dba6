//! Fallback controller — degraded answers when the loop cannot deliver.
//!
//! Two levels, never more:
//! 1. No model configured at all → a fixed operator-facing message.
//! 2. The loop aborted or failed → exactly one direct, tool-free completion
//!    with the original (non-augmented) input; if that also fails, an
//!    apology that embeds the loop failure's description so the user's
//!    report is diagnosable.
//!
//! The controller is a pure function of the loop's `Result` — it never
//! retries the tool loop, bounding worst-case latency at one extra call.

use crate::executor::LoopFailure;
use memoclaw_core::provider::{CompletionRequest, Provider};
use std::sync::Arc;
use tracing::{info, warn};

/// Shown when no language model is configured at all.
pub const DEGRADED_MESSAGE: &str = "The assistant is not configured: no language model is \
available. Set MEMOCLAW_API_KEY (or configure api_key in config.toml) and restart.";

/// Handles loop failures with one level of degradation.
pub struct FallbackController {
    provider: Arc<dyn Provider>,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl FallbackController {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            temperature: 0.7,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Produce a best-effort answer after the loop failed.
    ///
    /// Takes the *original* user input, not the memory-augmented one — the
    /// direct call should see exactly what the user typed.
    pub async fn recover(&self, original_input: &str, failure: &LoopFailure) -> String {
        info!(failure = %failure, "Falling back to a direct completion");

        let mut request = CompletionRequest::direct(original_input);
        request.temperature = self.temperature;
        request.max_tokens = self.max_tokens;

        match self.provider.complete(request).await {
            Ok(completion) => completion.text,
            Err(e) => {
                warn!(error = %e, "Fallback completion also failed");
                format!(
                    "I encountered an error while processing your request: {failure}"
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use memoclaw_core::error::ProviderError;
    use memoclaw_core::provider::Completion;
    use std::sync::Mutex;

    struct DirectProvider {
        calls: Mutex<Vec<CompletionRequest>>,
    }

    #[async_trait]
    impl Provider for DirectProvider {
        fn name(&self) -> &str {
            "direct"
        }
        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> Result<Completion, ProviderError> {
            self.calls.lock().unwrap().push(request);
            Ok(Completion {
                text: "direct answer".into(),
                model: "m".into(),
                usage: None,
            })
        }
    }

    struct AlwaysFailing;

    #[async_trait]
    impl Provider for AlwaysFailing {
        fn name(&self) -> &str {
            "failing"
        }
        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> Result<Completion, ProviderError> {
            Err(ProviderError::Network("still down".into()))
        }
    }

    #[tokio::test]
    async fn recover_issues_one_tool_free_direct_call() {
        let provider = Arc::new(DirectProvider {
            calls: Mutex::new(Vec::new()),
        });
        let controller = FallbackController::new(provider.clone());

        let failure = LoopFailure::Exhausted { iterations: 5 };
        let output = controller.recover("what's the weather?", &failure).await;
        assert_eq!(output, "direct answer");

        let calls = provider.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        // Original input, no system prompt, no history, no tools
        assert_eq!(calls[0].input, "what's the weather?");
        assert!(calls[0].system.is_empty());
        assert!(calls[0].history.is_empty());
    }

    #[tokio::test]
    async fn double_failure_yields_apology_with_reason() {
        let controller = FallbackController::new(Arc::new(AlwaysFailing));
        let failure = LoopFailure::TimedOut {
            elapsed: std::time::Duration::from_secs(61),
        };
        let output = controller.recover("hello", &failure).await;
        assert!(output.starts_with("I encountered an error"));
        assert!(output.contains("time budget"));
    }
}
