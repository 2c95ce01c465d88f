//! Gemini adapter for content analysis.
//!
//! One operation per modality; each builds a French prompt instructing the
//! model to answer in the section-tagged format parsed by [`ClaimExtractor`].
//! Binary modalities upload the file first (two-step protocol, no retry).

use crate::adapters::ai::extractor::{
    ClaimExtractor, Extraction, TAG_DESCRIPTION, TAG_EXTRACTED_TEXT, TAG_RESUME, TAG_SUBJECT,
    TAG_TRANSCRIPTION, TAG_TYPE,
};
use crate::domain::{AnalyzedContent, ContentKind, DomainError};
use crate::ports::AnalysisPort;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

const UPLOAD_URL: &str = "https://generativelanguage.googleapis.com/upload/v1beta/files";
const GENERATE_URL_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini content-analysis adapter.
///
/// Stateless after construction; one instance is shared across concurrent
/// pipeline tasks.
pub struct GeminiAdapter {
    client: reqwest::Client,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl GeminiAdapter {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            timeout,
        }
    }

    fn text_prompt(text: &str) -> String {
        format!(
            "Analyse ce texte et extrait les affirmations factuelles vérifiables.\n\n\
             Texte: {text}\n\n\
             Retourne au format:\n\
             RESUME: [résumé court du contenu]\n\
             AFFIRMATIONS:\n\
             1. [première affirmation factuelle]\n\
             2. [deuxième affirmation factuelle]\n\
             etc.\n\n\
             Si aucune affirmation factuelle, retourne juste le résumé."
        )
    }

    fn image_prompt() -> &'static str {
        "Analyse cette image et:\n\
         1. Décris son contenu\n\
         2. Identifie toute affirmation factuelle visible (texte, graphiques, données)\n\
         3. Extrait les affirmations vérifiables\n\n\
         Format de réponse:\n\
         DESCRIPTION: [description de l'image]\n\
         TEXTE_EXTRAIT: [texte visible dans l'image]\n\
         AFFIRMATIONS:\n\
         1. [affirmation 1]\n\
         2. [affirmation 2]"
    }

    fn video_prompt() -> &'static str {
        "Analyse cette vidéo et:\n\
         1. Résume le contenu principal\n\
         2. Identifie les affirmations factuelles\n\
         3. Extrait le texte visible ou parlé\n\n\
         Format:\n\
         RESUME: [résumé de la vidéo]\n\
         AFFIRMATIONS:\n\
         1. [affirmation 1]\n\
         2. [affirmation 2]"
    }

    fn audio_prompt() -> &'static str {
        "Transcris cet audio et:\n\
         1. Extrait le texte parlé\n\
         2. Identifie les affirmations factuelles\n\n\
         Format:\n\
         TRANSCRIPTION: [texte complet]\n\
         AFFIRMATIONS:\n\
         1. [affirmation 1]\n\
         2. [affirmation 2]"
    }

    fn link_prompt(url: &str) -> String {
        format!(
            "Analyse ce lien et extrait les informations principales:\n\n\
             URL: {url}\n\n\
             Indique:\n\
             1. Type de contenu (article, vidéo YouTube, etc.)\n\
             2. Sujet principal\n\
             3. Affirmations factuelles clés\n\n\
             Format:\n\
             TYPE: [type de contenu]\n\
             SUJET: [sujet principal]\n\
             AFFIRMATIONS:\n\
             1. [affirmation 1]\n\
             2. [affirmation 2]"
        )
    }

    /// Upload a binary file to the provider. Two-step protocol prerequisite
    /// for image/video/audio; a failure here propagates and is never retried.
    async fn upload_file(&self, path: &Path) -> Result<UploadedFile, DomainError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| DomainError::UpstreamAnalysis(format!("read upload source: {e}")))?;
        let mime = mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string();

        info!(path = %path.display(), mime = %mime, size = bytes.len(), "uploading file to Gemini");

        let response = self
            .client
            .post(format!("{UPLOAD_URL}?key={}", self.api_key))
            .header("X-Goog-Upload-Protocol", "raw")
            .header("Content-Type", &mime)
            .timeout(self.timeout)
            .body(bytes)
            .send()
            .await
            .map_err(|e| self.transport_error("upload", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %text, "Gemini upload returned error");
            return Err(DomainError::UpstreamAnalysis(format!(
                "upload error {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            )));
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| DomainError::UpstreamAnalysis(format!("parse upload response: {e}")))?;

        Ok(UploadedFile {
            uri: uploaded.file.uri,
            mime_type: mime,
        })
    }

    /// Invoke `generateContent` with a text prompt and an optional uploaded
    /// file reference. Returns the raw section-tagged model text.
    async fn generate(&self, prompt: &str, file: Option<&UploadedFile>) -> Result<String, DomainError> {
        let mut parts = vec![Part::text(prompt)];
        if let Some(f) = file {
            parts.push(Part::file(&f.mime_type, &f.uri));
        }
        let request = GenerateRequest {
            contents: vec![Content { parts }],
        };

        let url = format!(
            "{GENERATE_URL_BASE}/{}:generateContent?key={}",
            self.model, self.api_key
        );
        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error("generate", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %text, "Gemini API returned error");
            return Err(DomainError::UpstreamAnalysis(format!(
                "API error {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            )));
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| DomainError::UpstreamAnalysis(format!("parse API response: {e}")))?;

        let raw = generated
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .ok_or_else(|| DomainError::UpstreamAnalysis("no candidates returned".to_string()))?;

        debug!(raw_len = raw.len(), "received Gemini response");
        Ok(raw)
    }

    fn transport_error(&self, op: &str, e: reqwest::Error) -> DomainError {
        if e.is_timeout() {
            DomainError::AnalysisTimeout(format!(
                "{op} exceeded {}s: {e}",
                self.timeout.as_secs()
            ))
        } else {
            DomainError::UpstreamAnalysis(format!("{op} request failed: {e}"))
        }
    }
}

/// Uploaded file handle returned by the two-step protocol.
struct UploadedFile {
    uri: String,
    mime_type: String,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_data: Option<FileData>,
}

impl Part {
    fn text(t: &str) -> Self {
        Self {
            text: Some(t.to_string()),
            file_data: None,
        }
    }

    fn file(mime_type: &str, uri: &str) -> Self {
        Self {
            text: None,
            file_data: Some(FileData {
                mime_type: mime_type.to_string(),
                file_uri: uri.to_string(),
            }),
        }
    }
}

#[derive(Serialize)]
struct FileData {
    mime_type: String,
    file_uri: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    file: UploadedFileInfo,
}

#[derive(Deserialize)]
struct UploadedFileInfo {
    uri: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// First `n` characters of `s`, on char boundaries.
fn take_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

fn non_empty(field: Option<&str>) -> Option<String> {
    field.filter(|s| !s.is_empty()).map(str::to_string)
}

#[async_trait::async_trait]
impl AnalysisPort for GeminiAdapter {
    async fn analyze_text(
        &self,
        text: &str,
        user_id: &str,
    ) -> Result<AnalyzedContent, DomainError> {
        info!(user_id, len = text.len(), "analyzing text");
        let raw = self.generate(&Self::text_prompt(text), None).await?;
        let ex: Extraction = ClaimExtractor::new(&[TAG_RESUME]).extract(&raw);

        let summary = non_empty(ex.field(TAG_RESUME)).unwrap_or_else(|| take_chars(text, 200));
        // Text fallback policy: with no extractable claims, the whole input
        // becomes the single query.
        let claims = if ex.claims.is_empty() {
            vec![text.to_string()]
        } else {
            ex.claims
        };

        info!(user_id, claims = claims.len(), "text analysis complete");
        Ok(AnalyzedContent::new(
            ContentKind::Text,
            user_id,
            Some(text.to_string()),
            Some(summary),
            claims,
        ))
    }

    async fn analyze_image(
        &self,
        path: &Path,
        user_id: &str,
    ) -> Result<AnalyzedContent, DomainError> {
        info!(user_id, path = %path.display(), "analyzing image");
        let file = self.upload_file(path).await?;
        let raw = self.generate(Self::image_prompt(), Some(&file)).await?;
        let ex = ClaimExtractor::new(&[TAG_DESCRIPTION, TAG_EXTRACTED_TEXT]).extract(&raw);

        info!(user_id, claims = ex.claims.len(), "image analysis complete");
        Ok(AnalyzedContent::new(
            ContentKind::Image,
            user_id,
            non_empty(ex.field(TAG_EXTRACTED_TEXT)),
            non_empty(ex.field(TAG_DESCRIPTION)),
            ex.claims,
        ))
    }

    async fn analyze_video(
        &self,
        path: &Path,
        user_id: &str,
    ) -> Result<AnalyzedContent, DomainError> {
        info!(user_id, path = %path.display(), "analyzing video");
        let file = self.upload_file(path).await?;
        let raw = self.generate(Self::video_prompt(), Some(&file)).await?;
        let ex = ClaimExtractor::new(&[TAG_RESUME]).extract(&raw);

        info!(user_id, claims = ex.claims.len(), "video analysis complete");
        Ok(AnalyzedContent::new(
            ContentKind::Video,
            user_id,
            None,
            non_empty(ex.field(TAG_RESUME)),
            ex.claims,
        ))
    }

    async fn analyze_audio(
        &self,
        path: &Path,
        user_id: &str,
    ) -> Result<AnalyzedContent, DomainError> {
        info!(user_id, path = %path.display(), "analyzing audio");
        let file = self.upload_file(path).await?;
        let raw = self.generate(Self::audio_prompt(), Some(&file)).await?;
        let ex = ClaimExtractor::new(&[TAG_TRANSCRIPTION]).extract(&raw);

        let transcription = non_empty(ex.field(TAG_TRANSCRIPTION));
        let summary = transcription.as_deref().map(|t| take_chars(t, 200));

        info!(user_id, claims = ex.claims.len(), "audio analysis complete");
        Ok(AnalyzedContent::new(
            ContentKind::Audio,
            user_id,
            transcription,
            summary,
            ex.claims,
        ))
    }

    async fn analyze_link(
        &self,
        url: &str,
        user_id: &str,
    ) -> Result<AnalyzedContent, DomainError> {
        info!(user_id, url, "analyzing link");
        let raw = self.generate(&Self::link_prompt(url), None).await?;
        let ex = ClaimExtractor::new(&[TAG_TYPE, TAG_SUBJECT]).extract(&raw);

        // Link fallback policy: a link that yields nothing verifiable fails
        // the whole operation.
        if ex.claims.is_empty() {
            return Err(DomainError::NoContent(format!(
                "no verifiable claims extracted from {url}"
            )));
        }

        let kind = ex.field(TAG_TYPE).unwrap_or_default();
        let subject = ex.field(TAG_SUBJECT).unwrap_or_default();
        let summary = if kind.is_empty() {
            subject.to_string()
        } else {
            format!("{kind} - {subject}")
        };

        info!(user_id, claims = ex.claims.len(), "link analysis complete");
        Ok(AnalyzedContent::new(
            ContentKind::Link,
            user_id,
            Some(url.to_string()),
            non_empty(Some(summary.as_str())),
            ex.claims,
        ))
    }
}
