//! Crypto Price Tool

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

pub(crate) const NAME: &str = "get_crypto_price";

/// Latest close of a crypto pair from the past week of bars
pub struct CryptoPriceTool {
    market: Arc<dyn MarketDataProvider>,
}

impl CryptoPriceTool {
    pub fn new(market: Arc<dyn MarketDataProvider>) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for CryptoPriceTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.into(),
            description: "Get the latest price of a cryptocurrency. \
                Use the 'SYMBOL-USD' format, e.g. 'BTC-USD', 'ETH-USD'."
                .into(),
            parameters: vec![ParameterSchema::required_string(
                "crypto_symbol",
                "Crypto pair in 'SYMBOL-USD' format",
            )],
            category: Some("market_data".into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let Some(symbol) = call.str_arg("crypto_symbol") else {
            return Ok(ToolResult::failure(NAME, "missing required argument: crypto_symbol"));
        };

        let bars = match self.market.history(symbol, Lookback::OneWeek).await {
            Ok(bars) => bars,
            Err(e) => {
                tracing::warn!(symbol, "Crypto lookup failed: {}", e);
                return Ok(ToolResult::failure(NAME, format!("failed to fetch crypto data: {}", e)));
            }
        };

        match PriceSummary::latest(symbol, &bars) {
            Some(summary) => Ok(ToolResult::success(
                NAME,
                format!(
                    "The latest price of {} is {}",
                    symbol,
                    format::usd_grouped(summary.latest_close)
                ),
            )
            .with_data(serde_json::to_value(&summary)?)),
            None => Ok(ToolResult::success(
                NAME,
                format!("No data found for crypto symbol {}.", symbol),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::MockMarketData;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_grouped_price() {
        let market = MockMarketData::new().with_closes("BTC-USD", &[dec!(64000), dec!(65000.5)]);
        let tool = CryptoPriceTool::new(Arc::new(market));
        let call = ToolCall::new(NAME).with_argument("crypto_symbol", "BTC-USD");

        let result = tool.execute(&call).await.unwrap();
        assert_eq!(result.output, "The latest price of BTC-USD is $65,000.50");
    }

    #[tokio::test]
    async fn test_unknown_pair() {
        let tool = CryptoPriceTool::new(Arc::new(MockMarketData::new()));
        let call = ToolCall::new(NAME).with_argument("crypto_symbol", "FAKE-USD");
        let result = tool.execute(&call).await.unwrap();
        assert!(result.output.contains("No data found"));
    }
}
