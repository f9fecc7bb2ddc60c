// Ticker symbol search

use crate::market::MarketClient;
use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{json_schema_integer, json_schema_object, json_schema_string, parse_arguments, Tool};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct SymbolSearchArgs {
    query: String,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    10
}

pub struct ListStockSymbolsTool {
    market: Arc<MarketClient>,
}

impl ListStockSymbolsTool {
    pub fn new(market: Arc<MarketClient>) -> Self {
        Self { market }
    }

    /// Up to `limit` symbols matching `query`; any failure yields an empty list.
    async fn symbols(&self, query: &str, limit: usize) -> Vec<String> {
        if limit == 0 || query.trim().is_empty() {
            return Vec::new();
        }
        match self.market.search(query, limit).await {
            Ok(quotes) => quotes
                .into_iter()
                .filter_map(|q| q.symbol)
                .take(limit)
                .collect(),
            Err(e) => {
                tracing::warn!(query, error = %e, "Symbol search failed");
                Vec::new()
            }
        }
    }
}

#[async_trait::async_trait]
impl Tool for ListStockSymbolsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "list_stock_symbols".to_string(),
            description: "Search ticker symbols matching a query. Returns a JSON array of symbols.".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "query": json_schema_string("Company name or partial ticker"),
                    "limit": json_schema_integer("Maximum number of symbols (default: 10)")
                }),
                vec!["query"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: SymbolSearchArgs =
            parse_arguments(arguments).context("Invalid arguments for list_stock_symbols")?;

        let symbols = self.symbols(&args.query, args.limit).await;
        let body = serde_json::to_string(&symbols).context("Failed to encode symbols")?;
        Ok(CallToolResult::text(body))
    }
}
