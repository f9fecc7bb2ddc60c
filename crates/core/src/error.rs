//! Error types shared by the stockwatch crates.

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by configuration loading and the HTTP transport.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The request never produced a response (connect failure, DNS, TLS).
    #[error("Network error for {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The request exceeded the configured timeout.
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    /// The server answered with a non-success status.
    #[error("HTTP error for {url}: {status} {body}")]
    Status { url: String, status: u16, body: String },

    /// The response body was not the JSON we expected.
    #[error("Invalid JSON from {url}: {message}")]
    Decode { url: String, message: String },

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Classify a reqwest failure that happened before a status was available.
    pub fn from_transport(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Network {
                url: url.to_string(),
                source: error,
            }
        }
    }

    /// Whether the failure came from the remote side rather than local setup.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Timeout { .. } | Self::Status { .. } | Self::Decode { .. }
        )
    }
}
