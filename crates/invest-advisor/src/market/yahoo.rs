//! Yahoo Finance chart API

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use yahoo_finance_api as yahoo;

use super::{Lookback, MarketDataProvider};
use crate::error::{AdvisorError, Result};
use crate::model::PriceBar;

/// Market data from Yahoo Finance, daily interval
#[derive(Debug, Default)]
pub struct YahooMarketData;

impl YahooMarketData {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MarketDataProvider for YahooMarketData {
    async fn history(&self, symbol: &str, lookback: Lookback) -> Result<Vec<PriceBar>> {
        let provider = yahoo::YahooConnector::new()
            .map_err(|e| AdvisorError::MarketData(e.to_string()))?;

        let response = provider
            .get_quote_range(symbol, "1d", lookback.as_range())
            .await
            .map_err(|e| AdvisorError::MarketData(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| AdvisorError::MarketData(e.to_string()))?;

        let bars: Vec<PriceBar> = quotes
            .iter()
            .filter_map(|q| {
                let timestamp = DateTime::from_timestamp(q.timestamp as i64, 0)
                    .unwrap_or_else(Utc::now);
                PriceBar::from_f64(timestamp, q.open, q.high, q.low, q.close)
            })
            .collect();

        tracing::debug!(symbol, range = lookback.as_range(), bars = bars.len(), "Fetched history");

        Ok(bars)
    }

    fn name(&self) -> &str {
        "Yahoo Finance"
    }
}
