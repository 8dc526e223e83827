//! Mock Market Data
//!
//! In-memory daily series for tests and offline demos.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{Lookback, MarketDataProvider};
use crate::error::{AdvisorError, Result};
use crate::model::PriceBar;

/// Mock market data with static series
#[derive(Debug, Default)]
pub struct MockMarketData {
    series: HashMap<String, Vec<PriceBar>>,
    unreachable: HashSet<String>,
}

impl MockMarketData {
    /// Empty provider: every symbol is unknown
    pub fn new() -> Self {
        Self::default()
    }

    /// Demo series for common IDX and US tickers, crypto pairs and GLD
    pub fn demo() -> Self {
        Self::new()
            .with_closes("BBCA.JK", &[dec!(9750), dec!(9800), dec!(9825), dec!(9900), dec!(9875)])
            .with_closes("TLKM.JK", &[dec!(3020), dec!(2990), dec!(3050), dec!(3010)])
            .with_closes("AAPL", &[dec!(221.30), dec!(224.10), dec!(226.85), dec!(225.40)])
            .with_closes("GOOGL", &[dec!(164.20), dec!(166.75), dec!(168.10), dec!(167.45)])
            .with_closes("BTC-USD", &[dec!(63800.10), dec!(64250.00), dec!(64910.75), dec!(65000.50)])
            .with_closes("ETH-USD", &[dec!(3390.00), dec!(3412.25), dec!(3450.80)])
            .with_closes("GLD", &[dec!(241.10), dec!(242.35), dec!(243.80)])
    }

    /// Add a series of closes, one bar per day ending today. Each bar's
    /// high/low sit 1% around its close.
    pub fn with_closes(mut self, symbol: &str, closes: &[Decimal]) -> Self {
        let end = Utc::now().date_naive();
        let count = closes.len() as i64;
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let day = end - Duration::days(count - 1 - i as i64);
                let timestamp = Utc.from_utc_datetime(&day.and_time(chrono::NaiveTime::MIN));
                PriceBar {
                    high: close * dec!(1.01),
                    low: close * dec!(0.99),
                    ..PriceBar::flat(timestamp, close)
                }
            })
            .collect();
        self.series.insert(symbol.to_uppercase(), bars);
        self
    }

    /// Add an explicit series
    pub fn with_series(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.series.insert(symbol.to_uppercase(), bars);
        self
    }

    /// Make `symbol` fail as if the network were down
    pub fn unreachable(mut self, symbol: &str) -> Self {
        self.unreachable.insert(symbol.to_uppercase());
        self
    }
}

#[async_trait]
impl MarketDataProvider for MockMarketData {
    async fn history(&self, symbol: &str, lookback: Lookback) -> Result<Vec<PriceBar>> {
        let key = symbol.trim().to_uppercase();

        if self.unreachable.contains(&key) {
            return Err(AdvisorError::MarketData(format!(
                "connection refused while fetching {}",
                symbol
            )));
        }

        let Some(bars) = self.series.get(&key) else {
            return Ok(Vec::new());
        };

        let Some(last) = bars.last() else {
            return Ok(Vec::new());
        };
        let cutoff = last.timestamp - Duration::days(lookback.days());

        Ok(bars.iter().filter(|b| b.timestamp > cutoff).cloned().collect())
    }

    fn name(&self) -> &str {
        "MockMarket"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_known_symbol() {
        let market = MockMarketData::demo();
        let bars = market.history("btc-usd", Lookback::OneWeek).await.unwrap();
        assert_eq!(bars.last().unwrap().close, dec!(65000.50));
    }

    #[tokio::test]
    async fn test_idx_demo_quotes_are_rupiah_levels() {
        let market = MockMarketData::demo();
        for symbol in ["BBCA.JK", "TLKM.JK"] {
            let bars = market.history(symbol, Lookback::OneWeek).await.unwrap();
            assert!(bars.iter().all(|b| b.close >= dec!(1000)), "{symbol} looks like a USD quote");
        }
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_empty() {
        let market = MockMarketData::demo();
        assert!(market.history("NOTREAL", Lookback::OneYear).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lookback_window() {
        let closes: Vec<Decimal> = (1..=30).map(Decimal::from).collect();
        let market = MockMarketData::new().with_closes("AAPL", &closes);

        let week = market.history("AAPL", Lookback::OneWeek).await.unwrap();
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].close, dec!(24));

        let year = market.history("AAPL", Lookback::OneYear).await.unwrap();
        assert_eq!(year.len(), 30);
    }

    #[tokio::test]
    async fn test_unreachable() {
        let market = MockMarketData::demo().unreachable("ZZZZ123");
        assert!(matches!(
            market.history("ZZZZ123", Lookback::OneYear).await,
            Err(AdvisorError::MarketData(_))
        ));
    }
}
