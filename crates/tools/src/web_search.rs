//! Web search tool — local search results.
//!
//! In production this would call a real search API (Brave, DuckDuckGo,
//! etc.). The local generator returns plausible results so the reasoning
//! loop can be tested end-to-end without network access.

use async_trait::async_trait;
use memoclaw_core::error::ToolError;
use memoclaw_core::tool::Tool;

const RESULT_COUNT: usize = 3;

pub struct WebSearchTool;

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn usage(&self) -> &str {
        "Search the web for information. Input: the search query. Returns titles, URLs, and snippets."
    }

    async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        let query = input.trim();
        if query.is_empty() {
            return Err(ToolError::InvalidInput("a search query is required".into()));
        }

        let results = generate_results(query);
        let mut out = format!("Search results for '{query}':\n");
        for (title, url, snippet) in results {
            out.push_str(&format!("- {title}\n  {url}\n  {snippet}\n"));
        }
        Ok(out)
    }
}

fn generate_results(query: &str) -> Vec<(String, String, String)> {
    let q = query.to_lowercase();

    // Context-aware canned results for common topics.
    if q.contains("rust") {
        return vec![
            (
                "The Rust Programming Language".into(),
                "https://doc.rust-lang.org/book/".into(),
                "Rust is a systems programming language focused on safety, speed, and concurrency.".into(),
            ),
            (
                "Rust by Example".into(),
                "https://doc.rust-lang.org/rust-by-example/".into(),
                "Runnable examples that illustrate Rust concepts and standard library usage.".into(),
            ),
            (
                "crates.io: Rust Package Registry".into(),
                "https://crates.io/".into(),
                "The Rust community's crate registry.".into(),
            ),
        ];
    }

    if q.contains("weather") {
        return vec![
            (
                "OpenWeatherMap".into(),
                "https://openweathermap.org/".into(),
                "Free weather API providing current data and forecasts for any location.".into(),
            ),
            (
                "National Weather Service".into(),
                "https://weather.gov/".into(),
                "Current conditions and forecasts across the United States.".into(),
            ),
        ];
    }

    // Generic fallback.
    (0..RESULT_COUNT)
        .map(|i| {
            (
                format!("Result {} for: {query}", i + 1),
                format!(
                    "https://example.com/search?q={}&p={}",
                    query.replace(' ', "+"),
                    i + 1
                ),
                format!("A relevant page about '{query}'."),
            )
        })
        .collect()
}
