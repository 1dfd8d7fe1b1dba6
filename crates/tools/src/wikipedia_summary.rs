//! Wikipedia summary tool — short encyclopedic answers.
//!
//! In production this would call the Wikipedia API and return the first
//! sentences of the best-matching article. The local implementation covers
//! a handful of well-known topics and degrades to a helpful "not found"
//! message, which is itself a behavior the loop must handle.

use async_trait::async_trait;
use memoclaw_core::error::ToolError;
use memoclaw_core::tool::Tool;

pub struct WikipediaSummaryTool;

#[async_trait]
impl Tool for WikipediaSummaryTool {
    fn name(&self) -> &str {
        "wikipedia_summary"
    }

    fn usage(&self) -> &str {
        "Look up a topic, person, or place on Wikipedia. Input: the topic, e.g. 'Eiffel Tower'."
    }

    async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        let topic = input.trim();
        if topic.is_empty() {
            return Err(ToolError::InvalidInput(
                "a topic is required, e.g. 'Eiffel Tower'".into(),
            ));
        }

        let q = topic.to_lowercase();
        let summary = ARTICLES
            .iter()
            .find(|(keys, _)| keys.iter().any(|k| q.contains(k)))
            .map(|(_, text)| *text);

        match summary {
            Some(text) => Ok(text.to_string()),
            None => Ok(format!(
                "Sorry, I could not find a Wikipedia page for '{topic}'. Try being more specific."
            )),
        }
    }
}

const ARTICLES: &[(&[&str], &str)] = &[
    (
        &["eiffel tower"],
        "The Eiffel Tower is a wrought-iron lattice tower on the Champ de Mars in Paris, France. It was designed and built by Gustave Eiffel's company for the 1889 World's Fair.",
    ),
    (
        &["marie curie"],
        "Marie Curie was a Polish and naturalised-French physicist and chemist who conducted pioneering research on radioactivity. She was the first woman to win a Nobel Prize and the only person to win in two scientific fields.",
    ),
    (
        &["rust", "rust programming"],
        "Rust is a multi-paradigm, general-purpose programming language that emphasizes performance, type safety, and concurrency. It enforces memory safety without a garbage collector.",
    ),
    (
        &["lucknow"],
        "Lucknow is the capital city of the Indian state of Uttar Pradesh. It has long been a multicultural centre known for its courtly manners, gardens, poetry, and cuisine.",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn known_topic_returns_summary() {
        let tool = WikipediaSummaryTool;
        let output = tool.invoke("what is the Eiffel Tower?").await.unwrap();
        assert!(output.contains("Paris"));
    }

    #[tokio::test]
    async fn unknown_topic_returns_not_found_message() {
        let tool = WikipediaSummaryTool;
        let output = tool.invoke("zzzz nonexistent").await.unwrap();
        assert!(output.contains("could not find"));
    }

    #[tokio::test]
    async fn empty_topic_is_rejected() {
        let tool = WikipediaSummaryTool;
        assert!(tool.invoke("").await.is_err());
    }
}
