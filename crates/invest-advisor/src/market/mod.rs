//! Market Data
//!
//! Abstraction over daily price history sources.

mod mock;
mod yahoo;

pub use mock::MockMarketData;
pub use yahoo::YahooMarketData;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::PriceBar;

/// History window requested from a provider
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lookback {
    OneWeek,
    OneYear,
}

impl Lookback {
    /// Range string understood by the chart API
    pub fn as_range(&self) -> &'static str {
        match self {
            Lookback::OneWeek => "7d",
            Lookback::OneYear => "1y",
        }
    }

    /// Approximate number of calendar days covered
    pub fn days(&self) -> i64 {
        match self {
            Lookback::OneWeek => 7,
            Lookback::OneYear => 365,
        }
    }
}

/// Market data provider trait (Strategy pattern)
///
/// An unknown symbol yields `Ok` with an empty series; only transport or
/// decoding problems are errors.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Daily bars for `symbol`, oldest first
    async fn history(&self, symbol: &str, lookback: Lookback) -> Result<Vec<PriceBar>>;

    /// Provider name
    fn name(&self) -> &str;
}
