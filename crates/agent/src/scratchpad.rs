//! Scratchpad — per-request record of the reasoning loop's steps.
//!
//! One `AgentStep` per completed think→act→observe iteration. The pad is
//! rendered back into the next prompt so the model sees its own prior
//! actions and their observations. It exists only for the duration of one
//! loop execution and is never persisted.

use serde::{Deserialize, Serialize};

/// One completed iteration: what the model thought, what it did, what came
/// back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentStep {
    pub thought: String,
    pub action: String,
    pub action_input: String,
    pub observation: String,
}

/// The loop's working record.
#[derive(Debug, Clone, Default)]
pub struct Scratchpad {
    steps: Vec<AgentStep>,
    /// Correction instruction queued after a malformed reply.
    correction: Option<String>,
    iterations: usize,
}

impl Scratchpad {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count an iteration.
    pub fn tick(&mut self) {
        self.iterations += 1;
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Record a completed step.
    pub fn push_step(&mut self, step: AgentStep) {
        self.correction = None;
        self.steps.push(step);
    }

    /// Queue a correction instruction after a malformed reply.
    pub fn push_correction(&mut self, instruction: String) {
        self.correction = Some(instruction);
    }

    pub fn steps(&self) -> &[AgentStep] {
        &self.steps
    }

    pub fn into_steps(self) -> Vec<AgentStep> {
        self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty() && self.correction.is_none()
    }

    /// Render the pad as the agent-visible transcript of prior iterations.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for step in &self.steps {
            if !step.thought.is_empty() {
                out.push_str(&format!("Thought: {}\n", step.thought));
            }
            out.push_str(&format!("Action: {}\n", step.action));
            out.push_str(&format!("Action Input: {}\n", step.action_input));
            out.push_str(&format!("Observation: {}\n", step.observation));
        }
        if let Some(correction) = &self.correction {
            out.push_str(&format!("{correction}\n"));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(n: usize) -> AgentStep {
        AgentStep {
            thought: format!("thought {n}"),
            action: "web_search".into(),
            action_input: format!("query {n}"),
            observation: format!("result {n}"),
        }
    }

    #[test]
    fn starts_empty() {
        let pad = Scratchpad::new();
        assert!(pad.is_empty());
        assert_eq!(pad.iterations(), 0);
        assert!(pad.render().is_empty());
    }

    #[test]
    fn renders_steps_in_order() {
        let mut pad = Scratchpad::new();
        pad.push_step(step(0));
        pad.push_step(step(1));

        let rendered = pad.render();
        let first = rendered.find("query 0").unwrap();
        let second = rendered.find("query 1").unwrap();
        assert!(first < second);
        assert!(rendered.contains("Observation: result 1"));
    }

    #[test]
    fn correction_is_rendered_then_cleared_by_next_step() {
        let mut pad = Scratchpad::new();
        pad.push_correction("Reply with the required format.".into());
        assert!(pad.render().contains("required format"));

        pad.push_step(step(0));
        assert!(!pad.render().contains("required format"));
    }

    #[test]
    fn tick_counts_iterations() {
        let mut pad = Scratchpad::new();
        pad.tick();
        pad.tick();
        assert_eq!(pad.iterations(), 2);
    }

    #[test]
    fn empty_thought_line_is_omitted() {
        let mut pad = Scratchpad::new();
        pad.push_step(AgentStep {
            thought: String::new(),
            action: "web_search".into(),
            action_input: "x".into(),
            observation: "y".into(),
        });
        assert!(!pad.render().contains("Thought:"));
    }
}
