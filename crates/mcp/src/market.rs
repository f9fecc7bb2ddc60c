//! Market-data client backed by the public Yahoo Finance JSON endpoints.
//!
//! Only the chart and search endpoints are used. Quotes come from the chart
//! endpoint's daily bars, falling back to `meta.regularMarketPrice` when the
//! market has not produced a bar for the day yet.

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use stockwatch_core::{CoreError, HttpTransport, MarketSettings};
use tracing::debug;
use url::Url;

/// Ranges accepted by the chart endpoint.
pub const SUPPORTED_PERIODS: &[&str] = &[
    "1d", "5d", "1mo", "3mo", "6mo", "1y", "2y", "5y", "10y", "ytd", "max",
];

#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    #[error(transparent)]
    Http(#[from] CoreError),

    #[error("Invalid symbol '{0}'")]
    InvalidSymbol(String),

    #[error("Unsupported period '{period}', expected one of: {}", SUPPORTED_PERIODS.join(", "))]
    InvalidPeriod { period: String },

    #[error("No price data for symbol '{0}'")]
    NoData(String),

    #[error("Market data error for '{symbol}': {message}")]
    Provider { symbol: String, message: String },
}

pub type MarketResult<T> = Result<T, MarketError>;

/// One daily OHLCV row.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// A search hit.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Quote {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub shortname: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    #[serde(default)]
    indicators: Option<Indicators>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    regular_market_price: Option<f64>,
    /// Exchange offset from UTC in seconds.
    #[serde(default)]
    gmtoffset: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteSeries>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteSeries {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    quotes: Option<Vec<Quote>>,
}

impl ChartResult {
    fn series(&self) -> Option<&QuoteSeries> {
        self.indicators.as_ref().and_then(|i| i.quote.first())
    }

    fn last_close(&self) -> Option<f64> {
        self.series()?.close.iter().rev().find_map(|c| *c)
    }

    fn bars(&self) -> Vec<PriceBar> {
        let (Some(timestamps), Some(series)) = (&self.timestamp, self.series()) else {
            return Vec::new();
        };
        let offset = self.meta.gmtoffset.unwrap_or(0);
        let at = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten();

        timestamps
            .iter()
            .enumerate()
            .filter_map(|(i, ts)| {
                let date = DateTime::from_timestamp(ts.checked_add(offset)?, 0)?.date_naive();
                Some(PriceBar {
                    date,
                    open: at(&series.open, i)?,
                    high: at(&series.high, i)?,
                    low: at(&series.low, i)?,
                    close: at(&series.close, i)?,
                    volume: at(&series.volume, i).unwrap_or(0.0) as u64,
                })
            })
            .collect()
    }
}

pub fn validate_symbol(symbol: &str) -> MarketResult<&str> {
    let symbol = symbol.trim();
    let valid = !symbol.is_empty()
        && symbol.len() <= 32
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=' | '_'));
    if valid {
        Ok(symbol)
    } else {
        Err(MarketError::InvalidSymbol(symbol.to_string()))
    }
}

pub struct MarketClient {
    transport: HttpTransport,
    chart_url: String,
    search_url: String,
}

impl MarketClient {
    pub fn new(settings: &MarketSettings) -> MarketResult<Self> {
        Ok(Self {
            transport: HttpTransport::new(&settings.http())?,
            chart_url: settings.chart_url.clone(),
            search_url: settings.search_url.clone(),
        })
    }

    fn chart_endpoint(&self, symbol: &str, range: &str) -> MarketResult<Url> {
        let mut url = Url::parse(&self.chart_url).map_err(CoreError::from)?;
        url.path_segments_mut()
            .map_err(|_| CoreError::Config(format!("Chart URL cannot be a base: {}", self.chart_url)))?
            .pop_if_empty()
            .push(symbol);
        url.query_pairs_mut()
            .append_pair("range", range)
            .append_pair("interval", "1d");
        Ok(url)
    }

    async fn chart(&self, symbol: &str, range: &str) -> MarketResult<ChartResult> {
        let symbol = validate_symbol(symbol)?;
        let url = self.chart_endpoint(symbol, range)?;
        debug!(symbol, range, "Fetching chart");

        let response: ChartResponse = self.transport.get(url.as_str()).await?;
        if let Some(error) = response.chart.error {
            return Err(MarketError::Provider {
                symbol: symbol.to_string(),
                message: error
                    .description
                    .or(error.code)
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        response
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| MarketError::NoData(symbol.to_string()))
    }

    /// Most recent price: today's last close, else the regular market price.
    pub async fn latest_price(&self, symbol: &str) -> MarketResult<f64> {
        let chart = self.chart(symbol, "1d").await?;
        chart
            .last_close()
            .or(chart.meta.regular_market_price)
            .ok_or_else(|| MarketError::NoData(symbol.trim().to_string()))
    }

    /// Daily bars covering `period` (one of [`SUPPORTED_PERIODS`]).
    pub async fn history(&self, symbol: &str, period: &str) -> MarketResult<Vec<PriceBar>> {
        if !SUPPORTED_PERIODS.contains(&period) {
            return Err(MarketError::InvalidPeriod {
                period: period.to_string(),
            });
        }
        Ok(self.chart(symbol, period).await?.bars())
    }

    /// Ticker search; a response without quotes yields an empty list.
    pub async fn search(&self, query: &str, limit: usize) -> MarketResult<Vec<Quote>> {
        debug!(query, limit, "Searching symbols");
        let params = [("q", query.to_string()), ("quotesCount", limit.to_string())];
        let response: SearchResponse = self.transport.get_with_query(&self.search_url, &params).await?;
        Ok(response.quotes.unwrap_or_default())
    }
}
