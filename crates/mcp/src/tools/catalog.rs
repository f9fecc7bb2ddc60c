// Plain-text tool catalog

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{json_schema_object, Tool};
use anyhow::Result;

const CATALOG: &[&str] = &[
    "Available tools in Stock Price Server:",
    "",
    "1. get_stock_price(symbol: str) -> float",
    "   Fetches the current stock price for the given symbol using Yahoo Finance API.",
    "",
    "2. stock_resource(symbol: str) -> str",
    "   Retrieves the current stock price for a given stock symbol (formatted output).",
    "",
    "3. get_stock_history(symbol: str, period: str = '1mo') -> str",
    "   Fetches historical stock data for a given symbol and period in CSV format.",
    "",
    "4. compare_stocks(symbol1: str, symbol2: str) -> str",
    "   Compares the current stock prices of two given stock symbols.",
    "",
    "5. list_stock_symbols(query: str, limit: int = 10) -> list[str]",
    "   Searches ticker symbols matching a query.",
    "",
    "6. list_tools() -> str",
    "   Lists all available tools in this MCP server (this tool).",
];

pub struct ListToolsTool;

#[async_trait::async_trait]
impl Tool for ListToolsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "list_tools".to_string(),
            description: "List every tool offered by this server with its signature.".to_string(),
            input_schema: json_schema_object(serde_json::json!({}), vec![]),
        }
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<CallToolResult> {
        Ok(CallToolResult::text(CATALOG.join("\n")))
    }
}
