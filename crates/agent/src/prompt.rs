//! Prompt assembly for the reasoning loop.
//!
//! The system section carries the persona, the tool roster, and the reply
//! format. The per-iteration input carries the (possibly memory-augmented)
//! question plus the rendered scratchpad.

use crate::scratchpad::Scratchpad;
use memoclaw_core::tool::ToolDescriptor;

/// The built-in assistant persona.
pub const DEFAULT_PERSONA: &str = "You are Memoclaw, a friendly and capable AI assistant. \
You are an expert at using your available tools to answer questions and complete tasks. \
You can think step-by-step to solve complex problems. \
Be concise unless the user asks for details.";

/// Instruction sent after a malformed reply, spending one loop iteration.
pub const CORRECTION_INSTRUCTION: &str = "Your previous reply was not in the required format. \
Reply with either:\nThought: <your reasoning>\nAction: <tool name>\nAction Input: <tool input>\n\
or:\nThought: <your reasoning>\nFinal Answer: <your answer to the user>";

/// Build the system prompt: persona + tool roster + reply format.
pub fn system_prompt(persona: &str, tools: &[ToolDescriptor]) -> String {
    let mut out = String::from(persona);

    out.push_str("\n\nYou have access to the following tools:\n");
    for tool in tools {
        out.push_str(&format!("- {}: {}\n", tool.name, tool.usage));
    }

    out.push_str(
        "\nTo use a tool, reply exactly in this format:\n\
         Thought: why you are taking this step\n\
         Action: the tool name, one of the tools listed above\n\
         Action Input: the input to the tool\n\
         \n\
         After each Action you will receive an Observation with the tool's output.\n\
         When you can answer the user, reply exactly in this format:\n\
         Thought: your final reasoning\n\
         Final Answer: your answer to the user\n\
         \n\
         Never include both an Action and a Final Answer in one reply.",
    );

    out
}

/// Build the per-iteration input: the question, then prior steps.
pub fn loop_input(augmented_input: &str, pad: &Scratchpad) -> String {
    if pad.is_empty() {
        return augmented_input.to_string();
    }
    format!("{augmented_input}\n\n{}", pad.render())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scratchpad::AgentStep;

    fn descriptors() -> Vec<ToolDescriptor> {
        vec![
            ToolDescriptor {
                name: "weather_lookup".into(),
                usage: "Get the weather for a city.".into(),
            },
            ToolDescriptor {
                name: "web_search".into(),
                usage: "Search the web.".into(),
            },
        ]
    }

    #[test]
    fn system_prompt_lists_tools_and_format() {
        let prompt = system_prompt(DEFAULT_PERSONA, &descriptors());
        assert!(prompt.contains("Memoclaw"));
        assert!(prompt.contains("- weather_lookup: Get the weather for a city."));
        assert!(prompt.contains("Action Input:"));
        assert!(prompt.contains("Final Answer:"));
    }

    #[test]
    fn loop_input_without_steps_is_just_the_question() {
        let pad = Scratchpad::new();
        assert_eq!(loop_input("What's the weather?", &pad), "What's the weather?");
    }

    #[test]
    fn loop_input_appends_scratchpad() {
        let mut pad = Scratchpad::new();
        pad.push_step(AgentStep {
            thought: "check it".into(),
            action: "weather_lookup".into(),
            action_input: "Paris".into(),
            observation: "18°C, clear".into(),
        });

        let input = loop_input("What's the weather in Paris?", &pad);
        assert!(input.starts_with("What's the weather in Paris?"));
        assert!(input.contains("Observation: 18°C, clear"));
    }
}
