//! Parser for the model's ReAct-style replies.
//!
//! The model answers in one of two shapes:
//!
//! ```text
//! Thought: I should check the weather first
//! Action: weather_lookup
//! Action Input: Paris
//! ```
//!
//! or
//!
//! ```text
//! Thought: I have everything I need
//! Final Answer: It's 18°C and clear in Paris.
//! ```
//!
//! Anything else — no markers, both markers, an action without input — is a
//! parse error. Parse errors do not abort the loop; the executor re-prompts
//! with a correction instruction, spending one iteration.

use thiserror::Error;

/// What the model decided to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentAction {
    /// Call a tool with the given input.
    Invoke { tool: String, input: String },
    /// Stop and answer the user.
    Final(String),
}

/// The parsed reply: the reasoning text plus the decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReply {
    /// Text of the `Thought:` section (or any free text before the marker).
    pub thought: String,
    pub action: AgentAction,
}

/// Ways a reply can fail to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("reply contains neither 'Final Answer:' nor 'Action:'")]
    Unrecognized,

    #[error("reply contains both 'Action:' and 'Final Answer:'")]
    Ambiguous,

    #[error("'Action:' given without an 'Action Input:' line")]
    MissingInput,

    #[error("'Action:' line names no tool")]
    MissingTool,
}

const ACTION: &str = "Action:";
const ACTION_INPUT: &str = "Action Input:";
const FINAL_ANSWER: &str = "Final Answer:";
const THOUGHT: &str = "Thought:";

/// Parse one model reply.
pub fn parse(text: &str) -> Result<ParsedReply, ParseError> {
    let lines: Vec<&str> = text.lines().collect();

    // Line-based scan so "Action Input:" never matches as "Action:".
    let action_line = lines
        .iter()
        .position(|l| l.trim_start().starts_with(ACTION) && !l.trim_start().starts_with(ACTION_INPUT));
    let final_idx = text.find(FINAL_ANSWER);

    match (action_line, final_idx) {
        (Some(_), Some(_)) => Err(ParseError::Ambiguous),
        (None, None) => Err(ParseError::Unrecognized),
        (None, Some(idx)) => {
            let answer = text[idx + FINAL_ANSWER.len()..].trim().to_string();
            Ok(ParsedReply {
                thought: thought_before(&text[..idx]),
                action: AgentAction::Final(answer),
            })
        }
        (Some(line_idx), None) => {
            let tool = lines[line_idx]
                .trim_start()
                .strip_prefix(ACTION)
                .unwrap_or_default()
                .trim()
                .to_string();
            if tool.is_empty() {
                return Err(ParseError::MissingTool);
            }

            // Input: everything after the "Action Input:" marker, which may
            // span multiple lines (fenced code blocks, long queries).
            let input_pos = text.find(ACTION_INPUT).ok_or(ParseError::MissingInput)?;
            let input = text[input_pos + ACTION_INPUT.len()..].trim().to_string();

            let head = &text[..text.find(ACTION).unwrap_or(0)];
            Ok(ParsedReply {
                thought: thought_before(head),
                action: AgentAction::Invoke { tool, input },
            })
        }
    }
}

/// Extract the thought text preceding a marker, dropping the label.
fn thought_before(head: &str) -> String {
    head.trim()
        .strip_prefix(THOUGHT)
        .unwrap_or(head.trim())
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_final_answer() {
        let reply = parse("Thought: I know this.\nFinal Answer: Paris is in France.").unwrap();
        assert_eq!(reply.thought, "I know this.");
        assert_eq!(
            reply.action,
            AgentAction::Final("Paris is in France.".into())
        );
    }

    #[test]
    fn parses_tool_invocation() {
        let reply =
            parse("Thought: need the weather\nAction: weather_lookup\nAction Input: Paris").unwrap();
        assert_eq!(reply.thought, "need the weather");
        assert_eq!(
            reply.action,
            AgentAction::Invoke {
                tool: "weather_lookup".into(),
                input: "Paris".into()
            }
        );
    }

    #[test]
    fn multiline_action_input_is_preserved() {
        let reply = parse(
            "Action: code_interpreter\nAction Input: ```python\n(2 + 3) * 4\n```",
        )
        .unwrap();
        match reply.action {
            AgentAction::Invoke { tool, input } => {
                assert_eq!(tool, "code_interpreter");
                assert!(input.contains("(2 + 3) * 4"));
            }
            other => panic!("expected Invoke, got {other:?}"),
        }
    }

    #[test]
    fn final_answer_may_span_lines() {
        let reply = parse("Final Answer: line one\nline two").unwrap();
        assert_eq!(reply.action, AgentAction::Final("line one\nline two".into()));
    }

    #[test]
    fn missing_markers_is_unrecognized() {
        assert_eq!(
            parse("I think the answer is probably 42.").unwrap_err(),
            ParseError::Unrecognized
        );
    }

    #[test]
    fn both_markers_is_ambiguous() {
        let text = "Action: web_search\nAction Input: x\nFinal Answer: done";
        assert_eq!(parse(text).unwrap_err(), ParseError::Ambiguous);
    }

    #[test]
    fn action_without_input_is_an_error() {
        assert_eq!(
            parse("Action: weather_lookup").unwrap_err(),
            ParseError::MissingInput
        );
    }

    #[test]
    fn action_without_tool_name_is_an_error() {
        assert_eq!(
            parse("Action:\nAction Input: Paris").unwrap_err(),
            ParseError::MissingTool
        );
    }

    #[test]
    fn missing_thought_is_tolerated() {
        let reply = parse("Final Answer: 42").unwrap();
        assert!(reply.thought.is_empty());
        assert_eq!(reply.action, AgentAction::Final("42".into()));
    }

    #[test]
    fn action_input_on_same_scan_not_mistaken_for_action() {
        // A reply with only "Action Input:" but no "Action:" line
        assert_eq!(
            parse("Action Input: Paris").unwrap_err(),
            ParseError::Unrecognized
        );
    }
}
