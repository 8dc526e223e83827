//! Stock Price Tool
//!
//! Latest close and 52-week range from one year of daily bars.

use std::sync::Arc;

use async_trait::async_trait;

use agent_core::{
    tool::ParameterSchema,
    Result as CoreResult,
    Tool, ToolCall, ToolResult, ToolSchema,
};

use crate::format;
use crate::market::{Lookback, MarketDataProvider};
use crate::model::PriceSummary;

pub(crate) const NAME: &str = "get_stock_price";

/// Tool for looking up stock prices
pub struct StockPriceTool {
    market: Arc<dyn MarketDataProvider>,
}

impl StockPriceTool {
    pub fn new(market: Arc<dyn MarketDataProvider>) -> Self {
        Self { market }
    }

    fn render(summary: &PriceSummary) -> String {
        let mut out = format!(
            "Data for {}:\n- Latest price: {}",
            summary.symbol,
            format::usd(summary.latest_close)
        );
        if let Some(high) = summary.high_52w {
            out.push_str(&format!("\n- 52-week high: {}", format::usd(high)));
        }
        if let Some(low) = summary.low_52w {
            out.push_str(&format!("\n- 52-week low: {}", format::usd(low)));
        }
        out
    }
}

#[async_trait]
impl Tool for StockPriceTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.into(),
            description: "Get the latest price and 52-week high/low for a stock. \
                Use a valid Yahoo Finance ticker symbol: for Indonesian (IDX) stocks add the \
                '.JK' suffix, e.g. 'BBCA.JK', 'TLKM.JK'; for US stocks use the plain ticker, \
                e.g. 'AAPL', 'GOOGL'."
                .into(),
            parameters: vec![ParameterSchema::required_string(
                "ticker_symbol",
                "Yahoo Finance ticker symbol, e.g. 'BBCA.JK' or 'AAPL'",
            )],
            category: Some("market_data".into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let Some(symbol) = call.str_arg("ticker_symbol") else {
            return Ok(ToolResult::failure(NAME, "missing required argument: ticker_symbol"));
        };

        let bars = match self.market.history(symbol, Lookback::OneYear).await {
            Ok(bars) => bars,
            Err(e) => {
                tracing::warn!(symbol, "Stock lookup failed: {}", e);
                return Ok(ToolResult::failure(NAME, format!("failed to fetch stock data: {}", e)));
            }
        };

        match PriceSummary::with_range(symbol, &bars) {
            Some(summary) => Ok(ToolResult::success(NAME, Self::render(&summary))
                .with_data(serde_json::to_value(&summary)?)),
            None => Ok(ToolResult::success(
                NAME,
                format!("No data found for ticker {}. Make sure the ticker symbol is valid.", symbol),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::MockMarketData;
    use rust_decimal_macros::dec;

    fn tool(market: MockMarketData) -> StockPriceTool {
        StockPriceTool::new(Arc::new(market))
    }

    #[tokio::test]
    async fn test_latest_and_range() {
        let market = MockMarketData::new().with_closes("AAPL", &[dec!(200), dec!(250), dec!(225.4)]);
        let call = ToolCall::new(NAME).with_argument("ticker_symbol", "AAPL");

        let result = tool(market).execute(&call).await.unwrap();
        assert!(result.success);
        assert!(result.output.contains("Latest price: $225.40"));
        assert!(result.output.contains("52-week high: $252.50"));
        assert!(result.output.contains("52-week low: $198.00"));
        assert_eq!(result.data.unwrap()["symbol"], "AAPL");
    }

    #[tokio::test]
    async fn test_unknown_ticker() {
        let call = ToolCall::new(NAME).with_argument("ticker_symbol", "NOPE.JK");
        let result = tool(MockMarketData::new()).execute(&call).await.unwrap();
        assert_eq!(
            result.output,
            "No data found for ticker NOPE.JK. Make sure the ticker symbol is valid."
        );
        assert!(result.data.is_none());
    }

    #[tokio::test]
    async fn test_network_failure_is_text() {
        let call = ToolCall::new(NAME).with_argument("ticker_symbol", "ZZZZ123");
        let result = tool(MockMarketData::new().unreachable("ZZZZ123"))
            .execute(&call)
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.output.starts_with("Error: failed to fetch stock data:"));
    }

    #[tokio::test]
    async fn test_blank_argument() {
        let call = ToolCall::new(NAME).with_argument("ticker_symbol", "  ");
        let result = tool(MockMarketData::demo()).execute(&call).await.unwrap();
        assert!(!result.success);
        assert!(result.output.contains("ticker_symbol"));
    }
}
