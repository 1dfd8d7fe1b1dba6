//! The assistant service — composition root for one chat request.
//!
//! Per request: fuse memory into the prompt, run the reasoning loop, fall
//! back on failure, then persist the finished exchange into both memory
//! layers. Writes happen after the answer exists — recall for the current
//! request never sees the request's own turns.

use crate::executor::{AgentExecutor, LoopFailure};
use crate::fallback::{DEGRADED_MESSAGE, FallbackController};
use crate::fusion::MemoryFusion;
use crate::scratchpad::AgentStep;
use memoclaw_core::event::{DomainEvent, EventBus};
use memoclaw_core::memory::{RecordMetadata, VectorMemory};
use memoclaw_core::provider::Provider;
use memoclaw_core::tool::ToolRegistry;
use memoclaw_core::turn::{Exchange, Role, SessionId, Turn, UserId};
use memoclaw_memory::SessionStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Tunables for the assistant, with the deployment defaults.
#[derive(Debug, Clone)]
pub struct AssistantSettings {
    pub persona: Option<String>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub max_iterations: u32,
    pub max_execution: Duration,
    pub recall_limit: usize,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            persona: None,
            temperature: 0.7,
            max_tokens: None,
            max_iterations: crate::executor::DEFAULT_MAX_ITERATIONS,
            max_execution: crate::executor::DEFAULT_MAX_EXECUTION,
            recall_limit: memoclaw_core::memory::DEFAULT_RECALL_LIMIT,
        }
    }
}

/// The answer to one request, plus the exchange for callers that persist
/// transcripts externally.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub output: String,

    /// The completed user/agent exchange.
    pub exchange: Exchange,

    /// The loop's steps (empty for direct answers and degraded mode).
    pub steps: Vec<AgentStep>,

    /// Whether the fallback controller produced the output.
    pub fell_back: bool,
}

/// The assistant facade.
///
/// Constructed without a provider, it answers every request with the fixed
/// degraded-mode message — the original deployment behaved the same when
/// its API key was missing.
pub struct Assistant {
    executor: Option<AgentExecutor>,
    fallback: Option<FallbackController>,
    fusion: MemoryFusion,
    memory: Arc<dyn VectorMemory>,
    sessions: Arc<SessionStore>,
    event_bus: Arc<EventBus>,
}

impl Assistant {
    pub fn new(
        provider: Option<Arc<dyn Provider>>,
        tools: Arc<ToolRegistry>,
        memory: Arc<dyn VectorMemory>,
        sessions: Arc<SessionStore>,
        settings: AssistantSettings,
    ) -> Self {
        let event_bus = Arc::new(EventBus::default());

        let (executor, fallback) = match provider {
            Some(provider) => {
                let mut executor = AgentExecutor::new(provider.clone(), tools, event_bus.clone())
                    .with_temperature(settings.temperature)
                    .with_max_iterations(settings.max_iterations)
                    .with_max_execution(settings.max_execution);
                if let Some(persona) = &settings.persona {
                    executor = executor.with_persona(persona.clone());
                }
                if let Some(max_tokens) = settings.max_tokens {
                    executor = executor.with_max_tokens(max_tokens);
                }

                let mut fallback =
                    FallbackController::new(provider).with_temperature(settings.temperature);
                if let Some(max_tokens) = settings.max_tokens {
                    fallback = fallback.with_max_tokens(max_tokens);
                }

                (Some(executor), Some(fallback))
            }
            None => (None, None),
        };

        Self {
            executor,
            fallback,
            fusion: MemoryFusion::new(memory.clone(), sessions.clone(), settings.recall_limit),
            memory,
            sessions,
            event_bus,
        }
    }

    /// The event bus carrying this assistant's domain events.
    pub fn event_bus(&self) -> Arc<EventBus> {
        self.event_bus.clone()
    }

    /// Whether a language model is configured.
    pub fn is_configured(&self) -> bool {
        self.executor.is_some()
    }

    /// Handle one chat request.
    pub async fn chat(&self, user: &UserId, session: &SessionId, input: &str) -> ChatOutcome {
        let (Some(executor), Some(fallback)) = (&self.executor, &self.fallback) else {
            warn!(user = %user, "Chat requested but no model is configured");
            return ChatOutcome {
                output: DEGRADED_MESSAGE.to_string(),
                exchange: Exchange::new(Turn::user(input), Turn::agent(DEGRADED_MESSAGE)),
                steps: Vec::new(),
                fell_back: false,
            };
        };

        let context = self.fusion.build_context(user, session, input).await;

        let (output, steps, fell_back) = match executor
            .run(session.as_str(), &context.augmented_input, &context.history)
            .await
        {
            Ok(outcome) => (outcome.answer, outcome.steps, false),
            Err(failure) => {
                self.publish_fallback(session, &failure);
                (fallback.recover(input, &failure).await, Vec::new(), true)
            }
        };

        // Both turns go into long-term memory once the answer exists.
        self.remember(user, session, Role::User, input).await;
        self.remember(user, session, Role::Agent, &output).await;

        let exchange = Exchange::new(Turn::user(input), Turn::agent(&output));
        self.sessions
            .append(session.as_str(), exchange.clone())
            .await;

        info!(user = %user, session = %session, fell_back, "Chat request completed");

        ChatOutcome {
            output,
            exchange,
            steps,
            fell_back,
        }
    }

    /// Best-effort long-term memory write; failures are logged, typed, and
    /// swallowed.
    async fn remember(&self, user: &UserId, session: &SessionId, role: Role, text: &str) {
        let outcome = self
            .memory
            .insert(
                user.as_str(),
                text,
                RecordMetadata::new(role.as_str(), session.as_str()),
            )
            .await;

        if !outcome.is_inserted() {
            warn!(user = %user, "Long-term memory write failed (continuing)");
        }

        self.event_bus.publish(DomainEvent::MemoryAccessed {
            operation: "insert".into(),
            owner_id: user.as_str().to_string(),
            count: 1,
            timestamp: chrono::Utc::now(),
        });
    }

    fn publish_fallback(&self, session: &SessionId, failure: &LoopFailure) {
        self.event_bus.publish(DomainEvent::FallbackEngaged {
            session_id: session.as_str().to_string(),
            reason: failure.to_string(),
            timestamp: chrono::Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use memoclaw_core::error::ProviderError;
    use memoclaw_core::provider::{Completion, CompletionRequest};
    use memoclaw_memory::{HashEmbedder, InMemoryVectorStore};
    use std::sync::Mutex;

    struct ScriptedProvider {
        replies: Vec<String>,
        calls: Mutex<usize>,
    }

    impl ScriptedProvider {
        fn new(replies: Vec<&str>) -> Self {
            Self {
                replies: replies.into_iter().map(String::from).collect(),
                calls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }
        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> Result<Completion, ProviderError> {
            let mut calls = self.calls.lock().unwrap();
            let idx = (*calls).min(self.replies.len().saturating_sub(1));
            *calls += 1;
            Ok(Completion {
                text: self.replies[idx].clone(),
                model: "scripted".into(),
                usage: None,
            })
        }
    }

    fn assistant(provider: Option<Arc<dyn Provider>>) -> Assistant {
        Assistant::new(
            provider,
            Arc::new(memoclaw_tools::default_registry()),
            Arc::new(InMemoryVectorStore::new(Arc::new(HashEmbedder::default()))),
            Arc::new(SessionStore::new(16, 5)),
            AssistantSettings::default(),
        )
    }

    #[tokio::test]
    async fn unconfigured_assistant_returns_degraded_message() {
        let assistant = assistant(None);
        let outcome = assistant
            .chat(&UserId::new("u1"), &SessionId::new("s1"), "hello")
            .await;
        assert_eq!(outcome.output, DEGRADED_MESSAGE);
        assert!(!outcome.fell_back);
        assert!(!assistant.is_configured());
    }

    #[tokio::test]
    async fn successful_chat_updates_both_memory_layers() {
        let provider: Arc<dyn Provider> = Arc::new(ScriptedProvider::new(vec![
            "Thought: simple\nFinal Answer: Hello to you too!",
        ]));
        let memory = Arc::new(InMemoryVectorStore::new(Arc::new(HashEmbedder::default())));
        let sessions = Arc::new(SessionStore::new(16, 5));
        let assistant = Assistant::new(
            Some(provider),
            Arc::new(memoclaw_tools::default_registry()),
            memory.clone(),
            sessions.clone(),
            AssistantSettings::default(),
        );

        let outcome = assistant
            .chat(&UserId::new("u1"), &SessionId::new("s1"), "hello there friend")
            .await;

        assert_eq!(outcome.output, "Hello to you too!");
        // Both turns landed in long-term memory
        assert_eq!(memory.count("u1").await.unwrap(), 2);
        // And the exchange landed in the session window
        let turns = sessions.history("s1").await;
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].text, "hello there friend");
        assert_eq!(turns[1].text, "Hello to you too!");
    }

    #[tokio::test]
    async fn second_request_sees_first_in_history() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            "Thought: a\nFinal Answer: first answer",
            "Thought: b\nFinal Answer: second answer",
        ]));
        let assistant = assistant(Some(provider as Arc<dyn Provider>));
        let user = UserId::new("u1");
        let session = SessionId::new("s1");

        assistant.chat(&user, &session, "first question words").await;
        let outcome = assistant.chat(&user, &session, "second question words").await;

        assert_eq!(outcome.output, "second answer");
        assert_eq!(outcome.exchange.user.text, "second question words");
        assert_eq!(outcome.exchange.agent.text, "second answer");
    }

    #[tokio::test]
    async fn loop_failure_engages_fallback_once() {
        struct CountingProvider {
            calls: Mutex<Vec<CompletionRequest>>,
        }

        #[async_trait]
        impl Provider for CountingProvider {
            fn name(&self) -> &str {
                "counting"
            }
            async fn complete(
                &self,
                request: CompletionRequest,
            ) -> Result<Completion, ProviderError> {
                let is_direct = request.system.is_empty();
                self.calls.lock().unwrap().push(request);
                if is_direct {
                    // The fallback's tool-free direct call succeeds.
                    Ok(Completion {
                        text: "fallback answer".into(),
                        model: "m".into(),
                        usage: None,
                    })
                } else {
                    Err(ProviderError::Network("loop call fails".into()))
                }
            }
        }

        let provider = Arc::new(CountingProvider {
            calls: Mutex::new(Vec::new()),
        });
        let assistant = assistant(Some(provider.clone() as Arc<dyn Provider>));
        let mut events = assistant.event_bus().subscribe();

        let outcome = assistant
            .chat(&UserId::new("u1"), &SessionId::new("s1"), "hi")
            .await;

        assert_eq!(outcome.output, "fallback answer");
        assert!(outcome.fell_back);
        // One failed loop call + exactly one fallback call
        assert_eq!(provider.calls.lock().unwrap().len(), 2);

        // The fallback was announced on the event bus
        let mut saw_fallback = false;
        while let Ok(event) = events.try_recv() {
            if matches!(event.as_ref(), DomainEvent::FallbackEngaged { .. }) {
                saw_fallback = true;
            }
        }
        assert!(saw_fallback);
    }
}
