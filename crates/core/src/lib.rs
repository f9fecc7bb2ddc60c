// Shared plumbing for the stockwatch tools: configuration, logging, errors and
// the JSON-over-HTTP transport used by every external API client.

pub mod config;
pub mod error;
pub mod http;
pub mod logging;

pub use config::{AuditSettings, LoggingSettings, MarketSettings, StockwatchConfig};
pub use error::{CoreError, CoreResult};
pub use http::{HttpSettings, HttpTransport};
pub use logging::Logging;
