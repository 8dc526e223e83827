//! # invest-advisor
//!
//! Personal investment advisor: profiles the user through a scripted
//! dialogue, researches with four data lookups and answers with an
//! allocation in Rupiah.
//!
//! ## Tools
//!
//! ```text
//! ┌──────────────────┬──────────────────┬───────────────────────────────┐
//! │ name             │ argument         │ source                        │
//! ├──────────────────┼──────────────────┼───────────────────────────────┤
//! │ search_the_web   │ query            │ SearchProvider (Exa)          │
//! │ get_stock_price  │ ticker_symbol    │ MarketDataProvider, 1y daily  │
//! │ get_crypto_price │ crypto_symbol    │ MarketDataProvider, 7d daily  │
//! │ get_gold_price   │ -                │ MarketDataProvider, GLD, 7d   │
//! └──────────────────┴──────────────────┴───────────────────────────────┘
//! ```

pub mod svckit;
pub mod market;
pub mod search;
pub mod model;
pub mod prompt;
pub mod format;
pub mod error;

#[cfg(test)]
mod scenarios;

use std::sync::Arc;

use agent_core::ToolRegistry;

pub use error::{AdvisorError, Result};
pub use market::{Lookback, MarketDataProvider, MockMarketData, YahooMarketData};
pub use model::{PriceBar, PriceSummary, RiskTolerance, SearchHit};
pub use prompt::{system_prompt, DISCLAIMER};
pub use search::{ExaConfig, ExaSearchClient, SearchOptions, SearchProvider, StaticSearch};

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{
        WebSearchTool,
        StockPriceTool,
        CryptoPriceTool,
        GoldPriceTool,
    };
}

/// Register the four advisor tools, in their fixed order
pub fn register_tools(
    registry: &mut ToolRegistry,
    market: Arc<dyn MarketDataProvider>,
    search: Arc<dyn SearchProvider>,
) {
    registry.register(tools::WebSearchTool::new(search));
    registry.register(tools::StockPriceTool::new(market.clone()));
    registry.register(tools::CryptoPriceTool::new(market.clone()));
    registry.register(tools::GoldPriceTool::new(market));
}

/// A registry holding exactly the advisor tools
pub fn advisor_tools(
    market: Arc<dyn MarketDataProvider>,
    search: Arc<dyn SearchProvider>,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    register_tools(&mut registry, market, search);
    registry
}
