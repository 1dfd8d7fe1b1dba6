//! Built-in tool implementations for memoclaw.
//!
//! Tools give the assistant the ability to act: check the weather and the
//! calendar, search news and the web, look up stock prices and Wikipedia,
//! and evaluate code. Every tool is deterministic and local — production
//! deployments swap individual tools for API-backed versions without
//! touching the registry contract.

pub mod calendar_lookup;
pub mod code_interpreter;
pub mod news_search;
pub mod stock_lookup;
pub mod weather_lookup;
pub mod web_search;
pub mod wikipedia_summary;

use memoclaw_core::tool::ToolRegistry;

/// Create the default tool registry with all built-in tools.
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(web_search::WebSearchTool));
    registry.register(Box::new(weather_lookup::WeatherLookupTool));
    registry.register(Box::new(calendar_lookup::CalendarLookupTool));
    registry.register(Box::new(wikipedia_summary::WikipediaSummaryTool));
    registry.register(Box::new(news_search::NewsSearchTool));
    registry.register(Box::new(stock_lookup::StockLookupTool));
    registry.register(Box::new(code_interpreter::CodeInterpreterTool));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_all_tools() {
        let registry = default_registry();
        assert_eq!(registry.len(), 7);
        for name in [
            "web_search",
            "weather_lookup",
            "calendar_lookup",
            "wikipedia_summary",
            "news_search",
            "stock_lookup",
            "code_interpreter",
        ] {
            assert!(registry.contains(name), "missing tool: {name}");
        }
    }

    #[test]
    fn descriptors_are_sorted_and_described() {
        let registry = default_registry();
        let descriptors = registry.list();
        assert_eq!(descriptors.len(), 7);
        assert!(descriptors.windows(2).all(|w| w[0].name <= w[1].name));
        assert!(descriptors.iter().all(|d| !d.usage.is_empty()));
    }
}
