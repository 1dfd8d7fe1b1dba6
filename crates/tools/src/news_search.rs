//! News search tool — recent headlines on a topic.
//!
//! In production this would call a news API. The local generator returns
//! deterministic headlines derived from the query so agent behavior is
//! reproducible in tests.

use async_trait::async_trait;
use memoclaw_core::error::ToolError;
use memoclaw_core::tool::Tool;

const HEADLINE_COUNT: usize = 5;

pub struct NewsSearchTool;

#[async_trait]
impl Tool for NewsSearchTool {
    fn name(&self) -> &str {
        "news_search"
    }

    fn usage(&self) -> &str {
        "Get the latest news headlines on a topic. Input: the topic, e.g. 'artificial intelligence'."
    }

    async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        let topic = input.trim();
        if topic.is_empty() {
            return Err(ToolError::InvalidInput(
                "a topic is required, e.g. 'artificial intelligence'".into(),
            ));
        }

        let hash: u32 = topic
            .to_lowercase()
            .bytes()
            .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));

        let sources = ["Reuters", "AP", "BBC News", "The Verge", "Bloomberg"];
        let angles = [
            "analysts weigh in",
            "what it means for the industry",
            "five things to know",
            "experts remain divided",
            "a closer look",
        ];

        let mut out = format!("Here are the top {HEADLINE_COUNT} news articles for '{topic}':\n");
        for i in 0..HEADLINE_COUNT {
            let source = sources[(hash as usize + i) % sources.len()];
            let angle = angles[(hash as usize / 3 + i) % angles.len()];
            out.push_str(&format!("- {topic}: {angle} (Source: {source})\n"));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_headlines() {
        let tool = NewsSearchTool;
        let output = tool.invoke("rust language").await.unwrap();
        assert!(output.contains("rust language"));
        assert_eq!(output.lines().count(), HEADLINE_COUNT + 1);
        assert!(output.contains("Source:"));
    }

    #[tokio::test]
    async fn deterministic_for_same_topic() {
        let tool = NewsSearchTool;
        assert_eq!(
            tool.invoke("climate").await.unwrap(),
            tool.invoke("climate").await.unwrap()
        );
    }

    #[tokio::test]
    async fn empty_topic_is_rejected() {
        let tool = NewsSearchTool;
        let err = tool.invoke("").await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }
}
