//! The reasoning loop — bounded think→act→observe cycles.
//!
//! Each iteration asks the model for a reply, parses it as either a tool
//! invocation or a final answer, dispatches tools through the registry, and
//! feeds the observation back. Two budgets bound the loop: an iteration
//! count and a wall-clock deadline that is also applied to every in-flight
//! provider call, so a hanging backend cannot outlive the deadline.
//!
//! Malformed model output is recovered in-loop: the reply is discarded and
//! the next prompt carries a correction instruction. The retry spends an
//! iteration, so a model that never produces valid output still terminates.
//!
//! No error crosses this boundary as a panic or exception — the loop
//! returns `Result<LoopOutcome, LoopFailure>` and the fallback controller
//! decides what the user sees on failure.

use crate::parser::{self, AgentAction};
use crate::prompt;
use crate::scratchpad::{AgentStep, Scratchpad};
use memoclaw_core::error::ProviderError;
use memoclaw_core::event::{DomainEvent, EventBus};
use memoclaw_core::provider::{CompletionRequest, Provider};
use memoclaw_core::tool::ToolRegistry;
use memoclaw_core::turn::Turn;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default iteration budget per request.
pub const DEFAULT_MAX_ITERATIONS: u32 = 5;

/// Default wall-clock ceiling per request.
pub const DEFAULT_MAX_EXECUTION: Duration = Duration::from_secs(60);

/// A successful loop run.
#[derive(Debug, Clone)]
pub struct LoopOutcome {
    /// The final answer text.
    pub answer: String,

    /// Every completed think→act→observe step.
    pub steps: Vec<AgentStep>,

    /// Iterations consumed (including parse-retry iterations).
    pub iterations: usize,
}

/// Why the loop could not produce an answer.
#[derive(Debug, Clone, Error)]
pub enum LoopFailure {
    #[error("reasoning loop exhausted its iteration budget ({iterations} iterations)")]
    Exhausted { iterations: usize },

    #[error("reasoning loop exceeded its time budget after {elapsed:?}")]
    TimedOut { elapsed: Duration },

    #[error("provider failed: {0}")]
    Provider(#[from] ProviderError),
}

/// The bounded reasoning loop over one provider and one tool registry.
pub struct AgentExecutor {
    provider: Arc<dyn Provider>,
    tools: Arc<ToolRegistry>,
    persona: String,
    temperature: f32,
    max_tokens: Option<u32>,
    max_iterations: u32,
    max_execution: Duration,
    event_bus: Arc<EventBus>,
}

impl AgentExecutor {
    pub fn new(
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            provider,
            tools,
            persona: prompt::DEFAULT_PERSONA.into(),
            temperature: 0.7,
            max_tokens: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_execution: DEFAULT_MAX_EXECUTION,
            event_bus,
        }
    }

    /// Override the assistant persona.
    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = persona.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Set the iteration budget.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    /// Set the wall-clock ceiling.
    pub fn with_max_execution(mut self, ceiling: Duration) -> Self {
        self.max_execution = ceiling;
        self
    }

    /// Run the loop for one request.
    ///
    /// `input` is the (possibly memory-augmented) question; `history` is the
    /// session window's turns.
    pub async fn run(
        &self,
        session_id: &str,
        input: &str,
        history: &[Turn],
    ) -> Result<LoopOutcome, LoopFailure> {
        let started = Instant::now();
        let deadline = started + self.max_execution;
        let system = prompt::system_prompt(&self.persona, &self.tools.list());
        let mut pad = Scratchpad::new();

        info!(
            session_id,
            max_iterations = self.max_iterations,
            "Reasoning loop starting"
        );

        loop {
            if pad.iterations() >= self.max_iterations as usize {
                warn!(session_id, "Reasoning loop exhausted its iteration budget");
                return Err(LoopFailure::Exhausted {
                    iterations: pad.iterations(),
                });
            }
            pad.tick();

            let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
                warn!(session_id, "Reasoning loop exceeded its time budget");
                return Err(LoopFailure::TimedOut {
                    elapsed: started.elapsed(),
                });
            };

            debug!(session_id, iteration = pad.iterations(), "Loop iteration");

            let request = CompletionRequest {
                system: system.clone(),
                history: history.to_vec(),
                input: prompt::loop_input(input, &pad),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                // Stop before the model hallucinates its own observation.
                stop: vec!["Observation:".into()],
            };

            // The remaining wall-clock budget bounds the in-flight call.
            let completion =
                match tokio::time::timeout(remaining, self.provider.complete(request)).await {
                    Err(_) => {
                        warn!(session_id, "Provider call outlived the loop deadline");
                        return Err(LoopFailure::TimedOut {
                            elapsed: started.elapsed(),
                        });
                    }
                    Ok(Err(e)) => return Err(LoopFailure::Provider(e)),
                    Ok(Ok(completion)) => completion,
                };

            match parser::parse(&completion.text) {
                Ok(reply) => match reply.action {
                    AgentAction::Final(answer) => {
                        if let Some(usage) = &completion.usage {
                            self.event_bus.publish(DomainEvent::ResponseGenerated {
                                session_id: session_id.to_string(),
                                model: completion.model.clone(),
                                iterations: pad.iterations(),
                                tokens_used: usage.total_tokens,
                                timestamp: chrono::Utc::now(),
                            });
                        }

                        info!(
                            session_id,
                            iterations = pad.iterations(),
                            "Reasoning loop completed"
                        );
                        let iterations = pad.iterations();
                        return Ok(LoopOutcome {
                            answer,
                            steps: pad.into_steps(),
                            iterations,
                        });
                    }
                    AgentAction::Invoke { tool, input: tool_input } => {
                        let dispatch_started = Instant::now();
                        let observation = match self.tools.invoke(&tool, &tool_input).await {
                            Ok(output) => output,
                            // Unknown tool: fold into the observation so the
                            // model can correct its next step.
                            Err(e) => format!("Error: {e}"),
                        };
                        let duration_ms = dispatch_started.elapsed().as_millis() as u64;

                        debug!(session_id, tool = %tool, duration_ms, "Tool dispatched");
                        self.event_bus.publish(DomainEvent::ToolInvoked {
                            tool_name: tool.clone(),
                            success: !observation.starts_with("Error:"),
                            duration_ms,
                            timestamp: chrono::Utc::now(),
                        });

                        pad.push_step(AgentStep {
                            thought: reply.thought,
                            action: tool,
                            action_input: tool_input,
                            observation,
                        });
                    }
                },
                Err(parse_err) => {
                    debug!(session_id, error = %parse_err, "Malformed model reply, re-prompting");
                    pad.push_correction(format!(
                        "Your previous reply could not be used ({parse_err}).\n{}",
                        prompt::CORRECTION_INSTRUCTION
                    ));
                }
            }
        }
    }
}
