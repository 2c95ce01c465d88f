//! Console transport. Minimal stand-in for the chat transport layer.
//!
//! Reads one content item per stdin line, hands it to the pipeline and
//! prints the outcome. Real deployments replace this adapter with a chat
//! transport that also downloads binary attachments to local paths; the
//! pipeline boundary is identical.

use crate::domain::{ContentKind, IncomingContent, PipelineOutcome};
use crate::ports::PipelinePort;
use crate::usecases::format;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

pub struct ConsoleTransport {
    pipeline: Arc<dyn PipelinePort>,
    user_id: String,
}

impl ConsoleTransport {
    pub fn new(pipeline: Arc<dyn PipelinePort>, user_id: impl Into<String>) -> Self {
        Self {
            pipeline,
            user_id: user_id.into(),
        }
    }

    /// Loop until stdin closes. Each non-empty line is one text item.
    pub async fn run(&self) -> std::io::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        println!("verabot prêt. Entrez un texte ou un lien à vérifier.");

        while let Some(line) = lines.next_line().await? {
            let body = line.trim().to_string();
            if body.is_empty() {
                continue;
            }
            println!("{}", format::processing_message(ContentKind::Text));

            let outcome = self
                .pipeline
                .handle(IncomingContent::Text { body }, &self.user_id)
                .await;
            match outcome {
                PipelineOutcome::Success(message) => println!("{message}"),
                PipelineOutcome::Failure(category, message) => {
                    info!(category = ?category, "item failed");
                    println!("{message}");
                }
            }
        }
        Ok(())
    }
}
