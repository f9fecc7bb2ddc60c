// Dependency audit for uv-managed Python projects.
//
// Pipeline: manifest parsing -> OSV batch query -> PyPI update lookups ->
// Markdown report. Every stage runs sequentially and only consumes the value
// produced by the stage before it.

pub mod error;
pub mod manifest;
pub mod osv;
pub mod pipeline;
pub mod pypi;
pub mod report;
pub mod system_packages;
pub mod types;
pub mod version;

pub use error::{AuditError, AuditResult};
pub use pipeline::{report_file_name, AuditOutcome, Auditor};
pub use types::*;
