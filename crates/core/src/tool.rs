//! Tool trait — the abstraction over agent capabilities.
//!
//! Every tool takes a free-text input and produces a free-text output. A
//! tool's own failures are folded into readable output strings by the
//! registry, so the reasoning loop can treat "tool failed" as an
//! observation instead of control flow. The registry is built once at
//! startup and shared read-only for the life of the process.

use crate::error::ToolError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Name plus natural-language usage description, for prompt construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// The tool name the model must emit (e.g. "weather_lookup")
    pub name: String,

    /// Free-text description of what the tool does and what input it takes
    pub usage: String,
}

/// The core Tool trait.
///
/// Each capability (weather, calendar, news, stocks, search, wikipedia,
/// code) implements this trait and is registered in the ToolRegistry.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool.
    fn name(&self) -> &str;

    /// What this tool does and how to call it (sent to the LLM).
    fn usage(&self) -> &str;

    /// Execute the tool with the given free-text input.
    async fn invoke(&self, input: &str) -> std::result::Result<String, ToolError>;

    /// The descriptor used when listing tools in the prompt.
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name().to_string(),
            usage: self.usage().to_string(),
        }
    }
}

/// A fixed, named set of capabilities.
///
/// Register every tool during startup, then share the registry behind an
/// `Arc` — there is no mutation after that point, so concurrent readers
/// need no synchronization.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Descriptors of all registered tools, sorted by name so prompt
    /// construction is deterministic.
    pub fn list(&self) -> Vec<ToolDescriptor> {
        let mut descriptors: Vec<ToolDescriptor> =
            self.tools.values().map(|t| t.descriptor()).collect();
        descriptors.sort_by(|a, b| a.name.cmp(&b.name));
        descriptors
    }

    /// Whether a tool with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Invoke a tool by name.
    ///
    /// A registered tool's own error is converted into an `Ok` observation
    /// string ("Error: …") — tools never throw past the registry. Only an
    /// unregistered name is a registry-level error.
    pub async fn invoke(
        &self,
        name: &str,
        input: &str,
    ) -> std::result::Result<String, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::Unknown(name.to_string()))?;

        match tool.invoke(input).await {
            Ok(output) => Ok(output),
            Err(e) => Ok(format!("Error: {e}")),
        }
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
