// Configuration for the stockwatch binaries.
//
// Every field carries a serde default, so an absent file or an absent table
// yields the stock behaviour.

use crate::error::{CoreError, CoreResult};
use crate::http::HttpSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockwatchConfig {
    #[serde(default)]
    pub logging: LoggingSettings,

    #[serde(default)]
    pub audit: AuditSettings,

    #[serde(default)]
    pub market: MarketSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Name stamped on every log line.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,

    /// Write human-readable logs to stderr.
    #[serde(default = "default_true")]
    pub console: bool,

    /// Directory for daily `<YYYY-MM-DD>.log` files; no file sink when unset.
    #[serde(default)]
    pub file_dir: Option<String>,
}

fn default_app_name() -> String {
    "stockwatch".to_string()
}

fn default_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            level: default_level(),
            console: true,
            file_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditSettings {
    #[serde(default = "default_lockfile")]
    pub lockfile: String,

    #[serde(default = "default_manifest")]
    pub manifest: String,

    #[serde(default = "default_dockerfile")]
    pub dockerfile: String,

    /// Report file name prefix; the local date and `.md` are appended.
    #[serde(default = "default_report_prefix")]
    pub report_prefix: String,

    #[serde(default = "default_osv_url")]
    pub osv_url: String,

    /// PyPI JSON API base; `/{name}/json` is appended per package.
    #[serde(default = "default_pypi_url")]
    pub pypi_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_lockfile() -> String {
    "uv.lock".to_string()
}

fn default_manifest() -> String {
    "pyproject.toml".to_string()
}

fn default_dockerfile() -> String {
    "Dockerfile".to_string()
}

fn default_report_prefix() -> String {
    "dependency-audit".to_string()
}

fn default_osv_url() -> String {
    "https://api.osv.dev/v1/querybatch".to_string()
}

fn default_pypi_url() -> String {
    "https://pypi.org/pypi".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("stockwatch/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            lockfile: default_lockfile(),
            manifest: default_manifest(),
            dockerfile: default_dockerfile(),
            report_prefix: default_report_prefix(),
            osv_url: default_osv_url(),
            pypi_url: default_pypi_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl AuditSettings {
    pub fn http(&self) -> HttpSettings {
        HttpSettings {
            timeout: Duration::from_secs(self.timeout_secs),
            user_agent: self.user_agent.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSettings {
    /// Chart endpoint base; `/{symbol}` is appended.
    #[serde(default = "default_chart_url")]
    pub chart_url: String,

    #[serde(default = "default_search_url")]
    pub search_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_market_user_agent")]
    pub user_agent: String,
}

fn default_chart_url() -> String {
    "https://query1.finance.yahoo.com/v8/finance/chart".to_string()
}

fn default_search_url() -> String {
    "https://query1.finance.yahoo.com/v1/finance/search".to_string()
}

// Yahoo rejects requests without a browser-like agent.
fn default_market_user_agent() -> String {
    "Mozilla/5.0 (compatible; stockwatch)".to_string()
}

impl Default for MarketSettings {
    fn default() -> Self {
        Self {
            chart_url: default_chart_url(),
            search_url: default_search_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_market_user_agent(),
        }
    }
}

impl MarketSettings {
    pub fn http(&self) -> HttpSettings {
        HttpSettings {
            timeout: Duration::from_secs(self.timeout_secs),
            user_agent: self.user_agent.clone(),
        }
    }
}

impl StockwatchConfig {
    /// Load the configuration file if it exists, otherwise use defaults.
    pub fn load(config_path: &Path) -> CoreResult<Self> {
        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "Configuration file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)?;
        let config = Self::from_toml(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> CoreResult<Self> {
        toml::from_str(content)
            .map_err(|e| CoreError::Config(format!("Failed to parse configuration file: {}", e)))
    }

    fn validate(&self) -> CoreResult<()> {
        if self.audit.timeout_secs == 0 || self.market.timeout_secs == 0 {
            return Err(CoreError::Config(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        url::Url::parse(&self.audit.osv_url)?;
        url::Url::parse(&self.audit.pypi_url)?;
        url::Url::parse(&self.market.chart_url)?;
        url::Url::parse(&self.market.search_url)?;
        Ok(())
    }
}
