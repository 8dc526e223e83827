//! Service Kit - Agent Tools
//!
//! The four data lookups the advisor may call. Every tool answers with a
//! `ToolResult`; adapter failures become `Error: ...` text.

mod web_search;
mod stock_price;
mod crypto_price;
mod gold_price;

pub use web_search::WebSearchTool;
pub use stock_price::StockPriceTool;
pub use crypto_price::CryptoPriceTool;
pub use gold_price::GoldPriceTool;
