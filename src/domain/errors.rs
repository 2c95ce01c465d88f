//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these. The extractor and the
//! decoder never raise — only gateways and validation produce this taxonomy,
//! and the pipeline is the single place that converts it into an outcome.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("File too large: {0}")]
    FileTooLarge(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Analysis service error: {0}")]
    UpstreamAnalysis(String),

    #[error("Analysis timed out: {0}")]
    AnalysisTimeout(String),

    #[error("No actionable content: {0}")]
    NoContent(String),

    #[error("Fact-check service error: {0}")]
    UpstreamFactCheck(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
