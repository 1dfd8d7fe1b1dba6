//! Stock lookup tool — daily closing prices for one ticker.
//!
//! In production this would call a market-data API. The local generator
//! produces a deterministic price walk per ticker. Exactly one ticker per
//! call: models like to pass "TSLA AND NVDA", and that must come back as a
//! corrective message rather than garbage data.

use async_trait::async_trait;
use memoclaw_core::error::ToolError;
use memoclaw_core::tool::Tool;

const DAYS: usize = 10;

pub struct StockLookupTool;

#[async_trait]
impl Tool for StockLookupTool {
    fn name(&self) -> &str {
        "stock_lookup"
    }

    fn usage(&self) -> &str {
        "Get recent daily closing prices for a single ticker symbol, e.g. 'TSLA'. One ticker per call."
    }

    async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        let ticker = input.trim().to_uppercase();
        if ticker.is_empty() {
            return Err(ToolError::InvalidInput(
                "a ticker symbol is required, e.g. 'TSLA'".into(),
            ));
        }

        if ticker.contains(',') || ticker.contains(char::is_whitespace) {
            return Err(ToolError::InvalidInput(format!(
                "this tool accepts only ONE ticker symbol at a time, got '{ticker}'. Call it once per ticker."
            )));
        }

        if !ticker.chars().all(|c| c.is_ascii_alphabetic() || c == '.') {
            return Err(ToolError::InvalidInput(format!(
                "'{ticker}' is not a valid ticker symbol"
            )));
        }

        Ok(price_table(&ticker))
    }
}

/// Deterministic random-walk closing prices for a ticker.
fn price_table(ticker: &str) -> String {
    let hash: u64 = ticker
        .bytes()
        .fold(0u64, |acc, b| acc.wrapping_mul(131).wrapping_add(b as u64));

    let mut price = 20.0 + (hash % 480) as f64; // base in 20..500
    let mut out = format!("Daily closing prices for {ticker}:\ndate        price\n");

    let mut state = hash;
    for day in 0..DAYS {
        // xorshift step for the walk
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let delta = ((state % 200) as f64 - 100.0) / 50.0; // ±2.0
        price = (price + delta).max(1.0);
        out.push_str(&format!("day -{:>2}     {:.2}\n", DAYS - day, price));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_price_table() {
        let tool = StockLookupTool;
        let output = tool.invoke("TSLA").await.unwrap();
        assert!(output.contains("TSLA"));
        assert_eq!(output.lines().count(), DAYS + 2);
    }

    #[tokio::test]
    async fn lowercase_ticker_is_normalized() {
        let tool = StockLookupTool;
        let output = tool.invoke("nvda").await.unwrap();
        assert!(output.contains("NVDA"));
    }

    #[tokio::test]
    async fn deterministic_per_ticker() {
        let tool = StockLookupTool;
        assert_eq!(
            tool.invoke("AAPL").await.unwrap(),
            tool.invoke("AAPL").await.unwrap()
        );
    }

    #[tokio::test]
    async fn multiple_tickers_rejected() {
        let tool = StockLookupTool;
        for input in ["TSLA AND NVDA", "TSLA,NVDA", "TSLA NVDA"] {
            let err = tool.invoke(input).await.unwrap_err();
            assert!(matches!(err, ToolError::InvalidInput(_)), "input: {input}");
        }
    }

    #[tokio::test]
    async fn empty_input_rejected() {
        let tool = StockLookupTool;
        assert!(tool.invoke("").await.is_err());
    }

    #[tokio::test]
    async fn garbage_ticker_rejected() {
        let tool = StockLookupTool;
        assert!(tool.invoke("T$LA").await.is_err());
    }
}
