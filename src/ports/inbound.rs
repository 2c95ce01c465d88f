//! Inbound port. Transport (adapter) calls into the application.

use crate::domain::{IncomingContent, PipelineOutcome};

/// Input port: the transport layer hands one content item to the pipeline
/// and receives the only value that crosses the boundary back.
#[async_trait::async_trait]
pub trait PipelinePort: Send + Sync {
    /// Run the full validate → analyze → fact-check → format pipeline for
    /// one item. Never panics; every fault becomes a categorized failure.
    async fn handle(&self, content: IncomingContent, user_id: &str) -> PipelineOutcome;
}
