//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{AnalyzedContent, DomainError, FactCheckResult};
use std::path::Path;

/// Generative content-analysis gateway. One operation per modality; each
/// builds a modality-specific prompt, invokes the model and parses the
/// section-tagged reply into an [`AnalyzedContent`].
///
/// Binary modalities upload the file to the provider first (two-step
/// protocol); the upload is never retried.
#[async_trait::async_trait]
pub trait AnalysisPort: Send + Sync {
    async fn analyze_text(&self, text: &str, user_id: &str)
        -> Result<AnalyzedContent, DomainError>;

    async fn analyze_image(
        &self,
        path: &Path,
        user_id: &str,
    ) -> Result<AnalyzedContent, DomainError>;

    async fn analyze_video(
        &self,
        path: &Path,
        user_id: &str,
    ) -> Result<AnalyzedContent, DomainError>;

    async fn analyze_audio(
        &self,
        path: &Path,
        user_id: &str,
    ) -> Result<AnalyzedContent, DomainError>;

    async fn analyze_link(&self, url: &str, user_id: &str)
        -> Result<AnalyzedContent, DomainError>;
}

/// Fact-check gateway. One outbound request per call, bounded timeout,
/// no retries. Transport faults are folded into a failed
/// [`FactCheckResult`] rather than raised, so callers handle exactly one
/// shape.
#[async_trait::async_trait]
pub trait FactCheckPort: Send + Sync {
    /// Check one free-form query.
    async fn fact_check(&self, query: &str, user_id: &str) -> FactCheckResult;

    /// Check several claims at once: joins them into one query under a fixed
    /// instruction line and delegates to [`Self::fact_check`].
    async fn fact_check_many(&self, claims: &[String], user_id: &str) -> FactCheckResult;
}
