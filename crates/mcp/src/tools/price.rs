// Current-price tools

use crate::market::MarketClient;
use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{json_schema_object, json_schema_string, parse_arguments, Tool};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::cmp::Ordering;
use std::sync::Arc;

/// Returned in place of a price when none could be fetched.
pub const PRICE_UNAVAILABLE: f64 = -1.0;

/// Latest price for `symbol`, or [`PRICE_UNAVAILABLE`] after logging the failure.
pub async fn price_or_unavailable(market: &MarketClient, symbol: &str) -> f64 {
    match market.latest_price(symbol).await {
        Ok(price) => price,
        Err(e) => {
            tracing::error!(symbol, error = %e, "Error retrieving stock price");
            PRICE_UNAVAILABLE
        }
    }
}

#[derive(Debug, Deserialize)]
struct SymbolArgs {
    symbol: String,
}

fn symbol_schema(name: &str, description: &str) -> ToolSchema {
    ToolSchema {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: json_schema_object(
            serde_json::json!({
                "symbol": json_schema_string("Ticker symbol, e.g. AAPL")
            }),
            vec!["symbol"],
        ),
    }
}

/// Raw price lookup
pub struct GetStockPriceTool {
    market: Arc<MarketClient>,
}

impl GetStockPriceTool {
    pub fn new(market: Arc<MarketClient>) -> Self {
        Self { market }
    }
}

#[async_trait::async_trait]
impl Tool for GetStockPriceTool {
    fn schema(&self) -> ToolSchema {
        symbol_schema(
            "get_stock_price",
            "Fetch the current stock price for a symbol. Returns -1.0 when the price cannot be determined.",
        )
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: SymbolArgs =
            parse_arguments(arguments).context("Invalid arguments for get_stock_price")?;

        let price = price_or_unavailable(&self.market, &args.symbol).await;
        // Debug formatting keeps the trailing ".0" on whole numbers.
        Ok(CallToolResult::text(format!("{:?}", price)))
    }
}

/// Human-readable price sentence
pub struct StockResourceTool {
    market: Arc<MarketClient>,
}

impl StockResourceTool {
    pub fn new(market: Arc<MarketClient>) -> Self {
        Self { market }
    }
}

#[async_trait::async_trait]
impl Tool for StockResourceTool {
    fn schema(&self) -> ToolSchema {
        symbol_schema(
            "stock_resource",
            "Describe the current price of a stock symbol as a sentence.",
        )
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: SymbolArgs =
            parse_arguments(arguments).context("Invalid arguments for stock_resource")?;

        let price = price_or_unavailable(&self.market, &args.symbol).await;
        if price < 0.0 {
            let message = format!("Error: Could not retrieve price for symbol '{}'.", args.symbol);
            tracing::error!("{}", message);
            return Ok(CallToolResult::failure(message));
        }

        Ok(CallToolResult::text(format!(
            "The current price of '{}' is ${:.2}.",
            args.symbol, price
        )))
    }
}

#[derive(Debug, Deserialize)]
struct CompareArgs {
    symbol1: String,
    symbol2: String,
}

/// Compare two current prices
pub struct CompareStocksTool {
    market: Arc<MarketClient>,
}

impl CompareStocksTool {
    pub fn new(market: Arc<MarketClient>) -> Self {
        Self { market }
    }
}

fn comparison_sentence(symbol1: &str, price1: f64, symbol2: &str, price2: f64) -> String {
    match price1.partial_cmp(&price2) {
        Some(Ordering::Greater) => format!(
            "{} (${:.2}) is higher than {} (${:.2}).",
            symbol1, price1, symbol2, price2
        ),
        Some(Ordering::Less) => format!(
            "{} (${:.2}) is lower than {} (${:.2}).",
            symbol1, price1, symbol2, price2
        ),
        _ => format!(
            "Both {} and {} have the same price (${:.2}).",
            symbol1, symbol2, price1
        ),
    }
}

#[async_trait::async_trait]
impl Tool for CompareStocksTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "compare_stocks".to_string(),
            description: "Compare the current prices of two stock symbols.".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "symbol1": json_schema_string("First ticker symbol"),
                    "symbol2": json_schema_string("Second ticker symbol")
                }),
                vec!["symbol1", "symbol2"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: CompareArgs =
            parse_arguments(arguments).context("Invalid arguments for compare_stocks")?;

        let price1 = price_or_unavailable(&self.market, &args.symbol1).await;
        let price2 = price_or_unavailable(&self.market, &args.symbol2).await;
        if price1 < 0.0 || price2 < 0.0 {
            return Ok(CallToolResult::failure(format!(
                "Error: Could not retrieve data for comparison of '{}' and '{}'.",
                args.symbol1, args.symbol2
            )));
        }

        Ok(CallToolResult::text(comparison_sentence(
            &args.symbol1,
            price1,
            &args.symbol2,
            price2,
        )))
    }
}
