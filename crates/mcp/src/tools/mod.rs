// Stock tools exposed over MCP

pub mod catalog;
pub mod history;
pub mod price;
mod registry;
pub mod symbols;

use crate::market::MarketClient;
use std::sync::Arc;

pub use catalog::ListToolsTool;
pub use history::GetStockHistoryTool;
pub use price::{CompareStocksTool, GetStockPriceTool, StockResourceTool};
pub use registry::{
    json_schema_integer, json_schema_object, json_schema_string, parse_arguments, Tool, ToolRegistry,
};
pub use symbols::ListStockSymbolsTool;

/// Registry holding every stock tool, all sharing one market client.
pub fn stock_registry(market: Arc<MarketClient>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(GetStockPriceTool::new(market.clone())));
    registry.register(Arc::new(StockResourceTool::new(market.clone())));
    registry.register(Arc::new(GetStockHistoryTool::new(market.clone())));
    registry.register(Arc::new(CompareStocksTool::new(market.clone())));
    registry.register(Arc::new(ListStockSymbolsTool::new(market)));
    registry.register(Arc::new(ListToolsTool));
    registry
}
