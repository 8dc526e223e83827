//! Gold Price Tool
//!
//! Gold is quoted through the GLD ETF; the tool takes no arguments.

use std::sync::Arc;

use async_trait::async_trait;

use agent_core::{Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use crate::format;
use crate::market::{Lookback, MarketDataProvider};
use crate::model::PriceSummary;

pub(crate) const NAME: &str = "get_gold_price";

/// Instrument used as the gold proxy
pub const GOLD_PROXY: &str = "GLD";

pub struct GoldPriceTool {
    market: Arc<dyn MarketDataProvider>,
}

impl GoldPriceTool {
    pub fn new(market: Arc<dyn MarketDataProvider>) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for GoldPriceTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.into(),
            description: "Get the current global gold price (based on the GLD ETF).".into(),
            parameters: vec![],
            category: Some("market_data".into()),
        }
    }

    async fn execute(&self, _call: &ToolCall) -> CoreResult<ToolResult> {
        let bars = match self.market.history(GOLD_PROXY, Lookback::OneWeek).await {
            Ok(bars) => bars,
            Err(e) => {
                tracing::warn!("Gold lookup failed: {}", e);
                return Ok(ToolResult::failure(
                    NAME,
                    format!("failed to fetch gold price ({}): {}", GOLD_PROXY, e),
                ));
            }
        };

        match PriceSummary::latest(GOLD_PROXY, &bars) {
            Some(summary) => Ok(ToolResult::success(
                NAME,
                format!(
                    "Gold price (based on {}) is currently {} per unit.",
                    GOLD_PROXY,
                    format::usd(summary.latest_close)
                ),
            )
            .with_data(serde_json::to_value(&summary)?)),
            None => Ok(ToolResult::failure(
                NAME,
                format!("no price data returned for gold ({})", GOLD_PROXY),
            )),
        }
    }
}
