// MCP (Model Context Protocol) stock price server
// Serves price, history and symbol-search tools to agent clients over stdio.

pub mod market;
pub mod protocol;
pub mod server;
pub mod tools;

pub use market::{MarketClient, MarketError, PriceBar, Quote};
pub use server::McpServer;
