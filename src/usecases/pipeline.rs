//! Fact-check pipeline. Orchestrates the per-item workflow.
//!
//! Drives the strictly linear stage machine
//! `Received → Validated → Analyzed → Queried → Formatted → Done` with an
//! absorbing failed state reachable from every non-terminal stage. This is
//! the only component the transport layer sees, and the single place where
//! the error taxonomy becomes a categorized outcome.

use crate::domain::{
    AnalyzedContent, ContentKind, DomainError, FailureCategory, IncomingContent, PipelineOutcome,
};
use crate::ports::{AnalysisPort, FactCheckPort, PipelinePort};
use crate::shared::temp::TempFile;
use crate::usecases::format;
use crate::usecases::validate::{self, SizeLimits};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Pipeline stages, in order. Failure is absorbing from any of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Received,
    Validated,
    Analyzed,
    Queried,
    Formatted,
    Done,
}

/// Per-item orchestrator. Stateless across items; one instance is shared by
/// all concurrent tasks.
pub struct FactCheckPipeline {
    analysis: Arc<dyn AnalysisPort>,
    fact_check: Arc<dyn FactCheckPort>,
    limits: SizeLimits,
}

impl FactCheckPipeline {
    pub fn new(
        analysis: Arc<dyn AnalysisPort>,
        fact_check: Arc<dyn FactCheckPort>,
        limits: SizeLimits,
    ) -> Self {
        Self {
            analysis,
            fact_check,
            limits,
        }
    }

    async fn run(
        &self,
        content: IncomingContent,
        user_id: &str,
        temp: &mut TempFile,
    ) -> PipelineOutcome {
        let mut stage = Stage::Received;

        // A text message containing a URL is link content, regardless of
        // the words around it.
        let content = match content {
            IncomingContent::Text { body } if !validate::extract_urls(&body).is_empty() => {
                debug!(user_id, "text contains a URL, re-routing to link handling");
                IncomingContent::Link { body }
            }
            other => other,
        };
        let kind = content.kind();
        info!(user_id, kind = %kind, "pipeline started");

        // Received → Validated
        match &content {
            IncomingContent::Image { path }
            | IncomingContent::Video { path }
            | IncomingContent::Audio { path } => {
                if let Err(e) = validate::validate_file_size(path, self.limits.for_kind(kind)) {
                    return self.fail(user_id, stage, e);
                }
                if let Err(e) = validate::validate_media_kind(path, kind) {
                    return self.fail(user_id, stage, e);
                }
            }
            IncomingContent::Link { body } => {
                if validate::extract_urls(body).is_empty() {
                    warn!(user_id, stage = ?stage, "no valid URL in link content");
                    return failure(
                        FailureCategory::InvalidUrl,
                        Some("Aucun lien valide détecté."),
                    );
                }
            }
            IncomingContent::Text { .. } => {}
        }
        stage = self.advance(user_id, stage, Stage::Validated);

        // Validated → Analyzed
        let analyzed = match self.analyze(&content, user_id).await {
            Ok(a) => a,
            Err(e) => return self.fail(user_id, stage, e),
        };
        stage = self.advance(user_id, stage, Stage::Analyzed);

        // The downloaded file is no longer needed once analysis is done;
        // the caller's release is idempotent and covers failure paths.
        temp.release();

        // Analyzed → Queried
        let query = match self.build_query(&analyzed) {
            Ok(q) => q,
            Err(outcome) => {
                warn!(user_id, stage = ?stage, "nothing actionable to fact-check");
                return outcome;
            }
        };
        let result = self.fact_check.fact_check(&query, user_id).await;
        if !result.succeeded {
            error!(
                user_id,
                stage = ?stage,
                kind = ?result.failure_kind,
                error = result.error_message.as_deref().unwrap_or(""),
                "fact-check failed"
            );
            return failure(FailureCategory::ApiError, result.error_message.as_deref());
        }
        stage = self.advance(user_id, stage, Stage::Queried);

        // Queried → Formatted
        let message = format::fact_check_response(
            kind,
            analyzed.summary.as_deref(),
            &analyzed.claims,
            &result.answer,
        );
        stage = self.advance(user_id, stage, Stage::Formatted);

        // Formatted → Done: handoff to the transport layer.
        self.advance(user_id, stage, Stage::Done);
        PipelineOutcome::Success(message)
    }

    async fn analyze(
        &self,
        content: &IncomingContent,
        user_id: &str,
    ) -> Result<AnalyzedContent, DomainError> {
        match content {
            IncomingContent::Text { body } => self.analysis.analyze_text(body, user_id).await,
            IncomingContent::Image { path } => self.analysis.analyze_image(path, user_id).await,
            IncomingContent::Video { path } => self.analysis.analyze_video(path, user_id).await,
            IncomingContent::Audio { path } => self.analysis.analyze_audio(path, user_id).await,
            IncomingContent::Link { body } => {
                // Validation guaranteed at least one URL; the first one wins.
                let urls = validate::extract_urls(body);
                let url = urls
                    .first()
                    .ok_or_else(|| DomainError::Internal("validated link lost its URL".into()))?;
                self.analysis.analyze_link(url, user_id).await
            }
        }
    }

    /// The fact-check query: joined claims, or the modality's fallback.
    fn build_query(&self, analyzed: &AnalyzedContent) -> Result<String, PipelineOutcome> {
        if !analyzed.claims.is_empty() {
            return Ok(analyzed.claims.join("\n"));
        }
        match analyzed.kind {
            // Spoken content with no discrete claims: check the whole
            // transcription.
            ContentKind::Audio => match analyzed
                .extracted_text
                .as_deref()
                .filter(|t| !t.is_empty())
            {
                Some(t) => Ok(t.to_string()),
                None => Err(failure(
                    FailureCategory::NoContent,
                    Some("Aucun contenu détecté dans l'audio."),
                )),
            },
            // Text and link gateways never return empty claims (their
            // fallback policies fire earlier); image and video stop here
            // without a fact-check call.
            _ => Err(failure(
                FailureCategory::NoContent,
                Some("Aucune affirmation factuelle détectée."),
            )),
        }
    }

    fn advance(&self, user_id: &str, from: Stage, to: Stage) -> Stage {
        debug!(user_id, from = ?from, to = ?to, "pipeline stage");
        to
    }

    /// Convert a taxonomy member into the absorbing failed state. Internal
    /// detail goes to the log; the user sees a short categorized message.
    fn fail(&self, user_id: &str, stage: Stage, err: DomainError) -> PipelineOutcome {
        error!(user_id, stage = ?stage, error = %err, "pipeline stage failed");
        let (category, detail) = match err {
            DomainError::FileTooLarge(d) => (FailureCategory::FileTooLarge, Some(d)),
            DomainError::UnsupportedFormat(_) | DomainError::Validation(_) => {
                (FailureCategory::UnsupportedFormat, None)
            }
            DomainError::NoContent(_) => (
                FailureCategory::NoContent,
                Some("Impossible d'extraire des affirmations de ce contenu.".to_string()),
            ),
            DomainError::UpstreamFactCheck(d) => (FailureCategory::ApiError, Some(d)),
            DomainError::UpstreamAnalysis(_)
            | DomainError::AnalysisTimeout(_)
            | DomainError::Internal(_) => (FailureCategory::ProcessingError, None),
        };
        failure(category, detail.as_deref())
    }
}

fn failure(category: FailureCategory, detail: Option<&str>) -> PipelineOutcome {
    PipelineOutcome::Failure(category, format::error_message(category, detail))
}

#[async_trait::async_trait]
impl PipelinePort for FactCheckPipeline {
    async fn handle(&self, content: IncomingContent, user_id: &str) -> PipelineOutcome {
        // Guard the transport-downloaded file for the whole task; release
        // is idempotent and also runs on drop, so every exit path cleans up
        // exactly once.
        let mut temp = content
            .local_path()
            .map(TempFile::new)
            .unwrap_or_else(TempFile::none);

        let outcome = self.run(content, user_id, &mut temp).await;
        temp.release();

        if let PipelineOutcome::Failure(category, _) = &outcome {
            info!(user_id, category = ?category, "pipeline finished with failure");
        } else {
            info!(user_id, "pipeline finished successfully");
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FactCheckResult, FailureKind};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records which modality was invoked and replays a canned result.
    struct StubAnalysis {
        calls: Mutex<Vec<&'static str>>,
        result: Box<dyn Fn(ContentKind, &str) -> Result<AnalyzedContent, DomainError> + Send + Sync>,
    }

    impl StubAnalysis {
        fn with_claims(claims: Vec<&'static str>) -> Self {
            Self::new(move |kind, user_id| {
                Ok(AnalyzedContent::new(
                    kind,
                    user_id,
                    Some("texte extrait".into()),
                    Some("résumé".into()),
                    claims.iter().map(|c| c.to_string()).collect(),
                ))
            })
        }

        fn new(
            f: impl Fn(ContentKind, &str) -> Result<AnalyzedContent, DomainError>
                + Send
                + Sync
                + 'static,
        ) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                result: Box::new(f),
            }
        }

        fn record(&self, op: &'static str) {
            self.calls.lock().unwrap().push(op);
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl AnalysisPort for StubAnalysis {
        async fn analyze_text(
            &self,
            _text: &str,
            user_id: &str,
        ) -> Result<AnalyzedContent, DomainError> {
            self.record("text");
            (self.result)(ContentKind::Text, user_id)
        }

        async fn analyze_image(
            &self,
            _path: &std::path::Path,
            user_id: &str,
        ) -> Result<AnalyzedContent, DomainError> {
            self.record("image");
            (self.result)(ContentKind::Image, user_id)
        }

        async fn analyze_video(
            &self,
            _path: &std::path::Path,
            user_id: &str,
        ) -> Result<AnalyzedContent, DomainError> {
            self.record("video");
            (self.result)(ContentKind::Video, user_id)
        }

        async fn analyze_audio(
            &self,
            _path: &std::path::Path,
            user_id: &str,
        ) -> Result<AnalyzedContent, DomainError> {
            self.record("audio");
            (self.result)(ContentKind::Audio, user_id)
        }

        async fn analyze_link(
            &self,
            _url: &str,
            user_id: &str,
        ) -> Result<AnalyzedContent, DomainError> {
            self.record("link");
            (self.result)(ContentKind::Link, user_id)
        }
    }

    /// Counts calls and replays a canned result; captures the last query.
    struct StubFactCheck {
        calls: AtomicUsize,
        last_query: Mutex<Option<String>>,
        result: FactCheckResult,
    }

    impl StubFactCheck {
        fn ok(answer: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                last_query: Mutex::new(None),
                result: FactCheckResult::ok(answer, Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                last_query: Mutex::new(None),
                result: FactCheckResult::fail(FailureKind::UpstreamStatus, "Erreur API Vera 503"),
            }
        }
    }

    #[async_trait::async_trait]
    impl FactCheckPort for StubFactCheck {
        async fn fact_check(&self, query: &str, _user_id: &str) -> FactCheckResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_query.lock().unwrap() = Some(query.to_string());
            self.result.clone()
        }

        async fn fact_check_many(&self, claims: &[String], user_id: &str) -> FactCheckResult {
            self.fact_check(&claims.join("\n"), user_id).await
        }
    }

    fn pipeline(
        analysis: Arc<StubAnalysis>,
        fact_check: Arc<StubFactCheck>,
    ) -> FactCheckPipeline {
        FactCheckPipeline::new(analysis, fact_check, SizeLimits::default())
    }

    fn temp_media(name: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        std::fs::write(&path, b"payload").unwrap();
        (dir, path)
    }

    #[tokio::test]
    async fn text_flows_end_to_end() {
        let analysis = Arc::new(StubAnalysis::with_claims(vec!["c1", "c2"]));
        let vera = Arc::new(StubFactCheck::ok("vérifié"));
        let p = pipeline(Arc::clone(&analysis), Arc::clone(&vera));

        let outcome = p
            .handle(
                IncomingContent::Text {
                    body: "la terre est plate".into(),
                },
                "u1",
            )
            .await;

        match outcome {
            PipelineOutcome::Success(msg) => {
                assert!(msg.contains("vérifié"));
                assert!(msg.contains("_c1_"));
            }
            other => panic!("expected success, got {other:?}"),
        }
        assert_eq!(analysis.calls(), vec!["text"]);
        // Claims are newline-joined into one query.
        assert_eq!(vera.last_query.lock().unwrap().as_deref(), Some("c1\nc2"));
    }

    #[tokio::test]
    async fn text_with_url_is_routed_to_link() {
        let analysis = Arc::new(StubAnalysis::with_claims(vec!["c"]));
        let vera = Arc::new(StubFactCheck::ok("ok"));
        let p = pipeline(Arc::clone(&analysis), vera);

        let outcome = p
            .handle(
                IncomingContent::Text {
                    body: "regarde https://example.com/article c'est fou".into(),
                },
                "u1",
            )
            .await;

        assert!(matches!(outcome, PipelineOutcome::Success(_)));
        assert_eq!(analysis.calls(), vec!["link"]);
    }

    #[tokio::test]
    async fn link_without_valid_url_fails() {
        let analysis = Arc::new(StubAnalysis::with_claims(vec!["c"]));
        let vera = Arc::new(StubFactCheck::ok("ok"));
        let p = pipeline(Arc::clone(&analysis), vera);

        let outcome = p
            .handle(
                IncomingContent::Link {
                    body: "pas de lien ici".into(),
                },
                "u1",
            )
            .await;

        assert!(matches!(
            outcome,
            PipelineOutcome::Failure(FailureCategory::InvalidUrl, _)
        ));
        assert!(analysis.calls().is_empty());
    }

    #[tokio::test]
    async fn image_with_zero_claims_never_reaches_fact_check() {
        let analysis = Arc::new(StubAnalysis::with_claims(vec![]));
        let vera = Arc::new(StubFactCheck::ok("ok"));
        let p = pipeline(analysis, Arc::clone(&vera));

        let (_dir, path) = temp_media("photo.jpg");
        let outcome = p.handle(IncomingContent::Image { path }, "u1").await;

        assert!(matches!(
            outcome,
            PipelineOutcome::Failure(FailureCategory::NoContent, _)
        ));
        assert_eq!(vera.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn audio_with_zero_claims_falls_back_to_transcription() {
        let analysis = Arc::new(StubAnalysis::new(|kind, user_id| {
            Ok(AnalyzedContent::new(
                kind,
                user_id,
                Some("transcription complète".into()),
                Some("résumé".into()),
                vec![],
            ))
        }));
        let vera = Arc::new(StubFactCheck::ok("ok"));
        let p = pipeline(analysis, Arc::clone(&vera));

        let (_dir, path) = temp_media("note.ogg");
        let outcome = p.handle(IncomingContent::Audio { path }, "u1").await;

        assert!(matches!(outcome, PipelineOutcome::Success(_)));
        assert_eq!(
            vera.last_query.lock().unwrap().as_deref(),
            Some("transcription complète")
        );
    }

    #[tokio::test]
    async fn audio_with_nothing_at_all_is_no_content() {
        let analysis = Arc::new(StubAnalysis::new(|kind, user_id| {
            Ok(AnalyzedContent::new(kind, user_id, None, None, vec![]))
        }));
        let vera = Arc::new(StubFactCheck::ok("ok"));
        let p = pipeline(analysis, Arc::clone(&vera));

        let (_dir, path) = temp_media("note.ogg");
        let outcome = p.handle(IncomingContent::Audio { path }, "u1").await;

        assert!(matches!(
            outcome,
            PipelineOutcome::Failure(FailureCategory::NoContent, _)
        ));
        assert_eq!(vera.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn fact_check_failure_becomes_api_error() {
        let analysis = Arc::new(StubAnalysis::with_claims(vec!["c"]));
        let vera = Arc::new(StubFactCheck::failing());
        let p = pipeline(analysis, vera);

        let outcome = p
            .handle(IncomingContent::Text { body: "texte".into() }, "u1")
            .await;

        match outcome {
            PipelineOutcome::Failure(FailureCategory::ApiError, msg) => {
                assert!(msg.contains("Erreur API"));
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn oversized_file_is_rejected_and_cleaned_up() {
        let analysis = Arc::new(StubAnalysis::with_claims(vec!["c"]));
        let vera = Arc::new(StubFactCheck::ok("ok"));
        let p = FactCheckPipeline::new(
            Arc::clone(&analysis) as Arc<dyn AnalysisPort>,
            vera,
            SizeLimits {
                image_mb: 0,
                ..SizeLimits::default()
            },
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.jpg");
        std::fs::write(&path, vec![0u8; 1024]).unwrap();

        let outcome = p
            .handle(IncomingContent::Image { path: path.clone() }, "u1")
            .await;

        assert!(matches!(
            outcome,
            PipelineOutcome::Failure(FailureCategory::FileTooLarge, _)
        ));
        assert!(analysis.calls().is_empty());
        assert!(!path.exists(), "temp file must be released on failure");
    }

    #[tokio::test]
    async fn wrong_media_type_is_unsupported() {
        let analysis = Arc::new(StubAnalysis::with_claims(vec!["c"]));
        let vera = Arc::new(StubFactCheck::ok("ok"));
        let p = pipeline(analysis, vera);

        let (_dir, path) = temp_media("song.mp3");
        let outcome = p.handle(IncomingContent::Image { path }, "u1").await;

        assert!(matches!(
            outcome,
            PipelineOutcome::Failure(FailureCategory::UnsupportedFormat, _)
        ));
    }

    #[tokio::test]
    async fn analysis_error_is_processing_error_and_cleans_up() {
        let analysis = Arc::new(StubAnalysis::new(|_, _| {
            Err(DomainError::UpstreamAnalysis("boom interne".into()))
        }));
        let vera = Arc::new(StubFactCheck::ok("ok"));
        let p = pipeline(analysis, Arc::clone(&vera));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("v.mp4");
        std::fs::write(&path, b"payload").unwrap();

        let outcome = p
            .handle(IncomingContent::Video { path: path.clone() }, "u1")
            .await;

        match outcome {
            PipelineOutcome::Failure(FailureCategory::ProcessingError, msg) => {
                // Internal detail is logged, never surfaced.
                assert!(!msg.contains("boom interne"));
            }
            other => panic!("expected processing error, got {other:?}"),
        }
        assert_eq!(vera.calls.load(Ordering::SeqCst), 0);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn success_path_releases_temp_file() {
        let analysis = Arc::new(StubAnalysis::with_claims(vec!["c"]));
        let vera = Arc::new(StubFactCheck::ok("ok"));
        let p = pipeline(analysis, vera);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pic.png");
        std::fs::write(&path, b"payload").unwrap();

        let outcome = p
            .handle(IncomingContent::Image { path: path.clone() }, "u1")
            .await;

        assert!(matches!(outcome, PipelineOutcome::Success(_)));
        assert!(!path.exists());
    }
}
