//! Mock analysis adapter for testing without API calls.
//!
//! Produces canned section-tagged output and runs it through the same
//! extractor as the real adapter, so the parsing path stays exercised.

use crate::adapters::ai::extractor::{
    ClaimExtractor, TAG_DESCRIPTION, TAG_EXTRACTED_TEXT, TAG_RESUME, TAG_SUBJECT,
    TAG_TRANSCRIPTION, TAG_TYPE,
};
use crate::domain::{AnalyzedContent, ContentKind, DomainError};
use crate::ports::AnalysisPort;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Mock analysis adapter.
///
/// Returns predetermined responses without network I/O. Simulates latency
/// with a configurable delay.
pub struct MockAnalysisAdapter {
    /// Simulated network delay in milliseconds.
    delay_ms: u64,
}

impl MockAnalysisAdapter {
    /// Create a new mock adapter with default delay (100ms).
    pub fn new() -> Self {
        Self { delay_ms: 100 }
    }

    /// Create a mock adapter with custom delay.
    pub fn with_delay(delay_ms: u64) -> Self {
        Self { delay_ms }
    }

    async fn simulate_latency(&self) {
        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
    }
}

impl Default for MockAnalysisAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AnalysisPort for MockAnalysisAdapter {
    async fn analyze_text(
        &self,
        text: &str,
        user_id: &str,
    ) -> Result<AnalyzedContent, DomainError> {
        info!(user_id, len = text.len(), "[MOCK] simulating text analysis");
        self.simulate_latency().await;

        let raw = format!(
            "RESUME: [MOCK] Analyse simulée d'un texte de {} caractères.\n\
             AFFIRMATIONS:\n\
             1. Première affirmation simulée.\n\
             2. Deuxième affirmation simulée.",
            text.len()
        );
        let ex = ClaimExtractor::new(&[TAG_RESUME]).extract(&raw);
        Ok(AnalyzedContent::new(
            ContentKind::Text,
            user_id,
            Some(text.to_string()),
            ex.field(TAG_RESUME).map(str::to_string),
            ex.claims,
        ))
    }

    async fn analyze_image(
        &self,
        path: &Path,
        user_id: &str,
    ) -> Result<AnalyzedContent, DomainError> {
        info!(user_id, path = %path.display(), "[MOCK] simulating image analysis");
        self.simulate_latency().await;

        let raw = "DESCRIPTION: [MOCK] Une image simulée contenant du texte.\n\
                   TEXTE_EXTRAIT: Texte simulé extrait de l'image.\n\
                   AFFIRMATIONS:\n\
                   1. Affirmation simulée visible dans l'image.";
        let ex = ClaimExtractor::new(&[TAG_DESCRIPTION, TAG_EXTRACTED_TEXT]).extract(raw);
        Ok(AnalyzedContent::new(
            ContentKind::Image,
            user_id,
            ex.field(TAG_EXTRACTED_TEXT).map(str::to_string),
            ex.field(TAG_DESCRIPTION).map(str::to_string),
            ex.claims,
        ))
    }

    async fn analyze_video(
        &self,
        path: &Path,
        user_id: &str,
    ) -> Result<AnalyzedContent, DomainError> {
        info!(user_id, path = %path.display(), "[MOCK] simulating video analysis");
        self.simulate_latency().await;

        let raw = "RESUME: [MOCK] Résumé simulé d'une vidéo.\n\
                   AFFIRMATIONS:\n\
                   1. Affirmation simulée entendue dans la vidéo.";
        let ex = ClaimExtractor::new(&[TAG_RESUME]).extract(raw);
        Ok(AnalyzedContent::new(
            ContentKind::Video,
            user_id,
            None,
            ex.field(TAG_RESUME).map(str::to_string),
            ex.claims,
        ))
    }

    async fn analyze_audio(
        &self,
        path: &Path,
        user_id: &str,
    ) -> Result<AnalyzedContent, DomainError> {
        info!(user_id, path = %path.display(), "[MOCK] simulating audio analysis");
        self.simulate_latency().await;

        let raw = "TRANSCRIPTION: [MOCK] Transcription simulée d'un message vocal.\n\
                   AFFIRMATIONS:\n\
                   1. Affirmation simulée prononcée dans l'audio.";
        let ex = ClaimExtractor::new(&[TAG_TRANSCRIPTION]).extract(raw);
        let transcription = ex.field(TAG_TRANSCRIPTION).map(str::to_string);
        Ok(AnalyzedContent::new(
            ContentKind::Audio,
            user_id,
            transcription.clone(),
            transcription,
            ex.claims,
        ))
    }

    async fn analyze_link(
        &self,
        url: &str,
        user_id: &str,
    ) -> Result<AnalyzedContent, DomainError> {
        info!(user_id, url, "[MOCK] simulating link analysis");
        self.simulate_latency().await;

        let raw = "TYPE: article\n\
                   SUJET: [MOCK] Sujet simulé\n\
                   AFFIRMATIONS:\n\
                   1. Affirmation simulée tirée du lien.";
        let ex = ClaimExtractor::new(&[TAG_TYPE, TAG_SUBJECT]).extract(raw);
        let summary = format!(
            "{} - {}",
            ex.field(TAG_TYPE).unwrap_or_default(),
            ex.field(TAG_SUBJECT).unwrap_or_default()
        );
        Ok(AnalyzedContent::new(
            ContentKind::Link,
            user_id,
            Some(url.to_string()),
            Some(summary),
            ex.claims,
        ))
    }
}
