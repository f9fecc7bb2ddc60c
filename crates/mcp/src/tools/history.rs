// Historical price data as CSV

use crate::market::{MarketClient, PriceBar};
use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{json_schema_object, json_schema_string, parse_arguments, Tool};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt::Write;
use std::sync::Arc;

const DEFAULT_PERIOD: &str = "1mo";

#[derive(Debug, Deserialize)]
struct HistoryArgs {
    symbol: String,
    #[serde(default = "default_period")]
    period: String,
}

fn default_period() -> String {
    DEFAULT_PERIOD.to_string()
}

pub fn bars_to_csv(bars: &[PriceBar]) -> String {
    let mut csv = String::from("Date,Open,High,Low,Close,Volume\n");
    for bar in bars {
        let _ = writeln!(
            csv,
            "{},{},{},{},{},{}",
            bar.date, bar.open, bar.high, bar.low, bar.close, bar.volume
        );
    }
    csv
}

pub struct GetStockHistoryTool {
    market: Arc<MarketClient>,
}

impl GetStockHistoryTool {
    pub fn new(market: Arc<MarketClient>) -> Self {
        Self { market }
    }
}

#[async_trait::async_trait]
impl Tool for GetStockHistoryTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_stock_history".to_string(),
            description: "Fetch daily historical prices for a symbol as CSV.".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "symbol": json_schema_string("Ticker symbol, e.g. AAPL"),
                    "period": json_schema_string(
                        "Range to fetch: 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd or max (default: 1mo)"
                    )
                }),
                vec!["symbol"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: HistoryArgs =
            parse_arguments(arguments).context("Invalid arguments for get_stock_history")?;

        match self.market.history(&args.symbol, &args.period).await {
            Ok(bars) if bars.is_empty() => Ok(CallToolResult::text(format!(
                "No historical data found for symbol '{}' with period '{}'.",
                args.symbol, args.period
            ))),
            Ok(bars) => Ok(CallToolResult::text(bars_to_csv(&bars))),
            Err(e) => {
                tracing::error!(symbol = %args.symbol, error = %e, "Error retrieving historical data");
                Ok(CallToolResult::failure(format!(
                    "Error fetching historical data: {}",
                    e
                )))
            }
        }
    }
}
