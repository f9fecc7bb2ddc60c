//! Error types for the audit pipeline.

use std::path::PathBuf;
use stockwatch_core::CoreError;

/// Result type for audit operations.
pub type AuditResult<T> = Result<T, AuditError>;

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// An input file exists but could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An input file exists but is not valid TOML.
    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// The batched OSV query failed; there is no partial vulnerability data.
    #[error("Vulnerability query failed: {0}")]
    Vulnerability(#[source] CoreError),

    /// The report could not be written.
    #[error("Failed to write report {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Core(#[from] CoreError),
}
