//! JSON-over-HTTP transport shared by the OSV, PyPI and market-data clients.
//!
//! Requests are issued one at a time and never retried: a failure is reported
//! to the caller, which decides whether it is fatal.

use crate::error::{CoreError, CoreResult};
use reqwest::{header, Client, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::debug;

/// Settings for building an [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Value of the `User-Agent` header.
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("stockwatch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// HTTP transport for JSON APIs.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given settings.
    pub fn new(settings: &HttpSettings) -> CoreResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent.clone())
            .default_headers(headers)
            .build()
            .map_err(|e| CoreError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Send the request and decode a JSON body, mapping every failure mode to
    /// a [`CoreError`] that names the URL.
    async fn execute<T: DeserializeOwned>(&self, url: &str, request: RequestBuilder) -> CoreResult<T> {
        let response = request
            .send()
            .await
            .map_err(|e| CoreError::from_transport(url, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CoreError::from_transport(url, e))?;

        if !status.is_success() {
            return Err(CoreError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| CoreError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    /// Execute a GET request.
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> CoreResult<T> {
        debug!(url = %url, "GET request");
        self.execute(url, self.client.get(url)).await
    }

    /// Execute a GET request with query parameters.
    pub async fn get_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        url: &str,
        query: &Q,
    ) -> CoreResult<T> {
        debug!(url = %url, "GET request with query");
        self.execute(url, self.client.get(url).query(query)).await
    }

    /// Execute a POST request with a JSON body.
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(&self, url: &str, body: &B) -> CoreResult<T> {
        debug!(url = %url, "POST request");
        self.execute(url, self.client.post(url).json(body)).await
    }
}
