//! Domain entities. Pure data structures for the core business.
//!
//! No Telegram/HTTP types here — these are mapped from adapters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Modality of a user-submitted content item. Set once at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Image,
    Video,
    Audio,
    Link,
}

impl ContentKind {
    /// French label used in user-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            ContentKind::Text => "texte",
            ContentKind::Image => "image",
            ContentKind::Video => "video",
            ContentKind::Audio => "audio",
            ContentKind::Link => "lien",
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Nature of the claims extracted from a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimKind {
    Factual,
    Opinion,
    Rumor,
    Question,
    Mixed,
    #[default]
    Unknown,
}

/// Result of analyzing one content item. Immutable after construction.
///
/// `claims` is never absent: an analysis that found nothing yields an empty
/// vector. Insertion order is detection order; duplicates are allowed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzedContent {
    pub kind: ContentKind,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub extracted_text: Option<String>,
    pub summary: Option<String>,
    pub claims: Vec<String>,
    pub claim_kind: ClaimKind,
}

impl AnalyzedContent {
    /// Assemble an analysis result. `claim_kind` is derived: Factual iff at
    /// least one claim was extracted, Unknown otherwise.
    pub fn new(
        kind: ContentKind,
        user_id: impl Into<String>,
        extracted_text: Option<String>,
        summary: Option<String>,
        claims: Vec<String>,
    ) -> Self {
        let claim_kind = if claims.is_empty() {
            ClaimKind::Unknown
        } else {
            ClaimKind::Factual
        };
        Self {
            kind,
            user_id: user_id.into(),
            created_at: Utc::now(),
            extracted_text,
            summary,
            claims,
            claim_kind,
        }
    }
}

/// One outbound query to the fact-check service. Consumed once.
#[derive(Debug, Clone, Serialize)]
pub struct FactCheckRequest {
    pub user_id: String,
    pub query: String,
    pub streaming: bool,
}

impl FactCheckRequest {
    pub fn new(user_id: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            query: query.into(),
            // All current call sites request non-streaming mode.
            streaming: false,
        }
    }
}

/// Why a fact-check attempt failed. Lets callers tell a timeout apart from
/// other network faults without parsing error strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Timeout,
    Network,
    UpstreamStatus,
    EmptyBody,
    Decode,
}

/// Terminal value of one fact-check call. Immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactCheckResult {
    pub succeeded: bool,
    /// Empty when `succeeded` is false; non-empty when true.
    pub answer: String,
    pub sources: Vec<String>,
    pub error_message: Option<String>,
    pub failure_kind: Option<FailureKind>,
}

impl FactCheckResult {
    pub fn ok(answer: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            succeeded: true,
            answer: answer.into(),
            sources,
            error_message: None,
            failure_kind: None,
        }
    }

    pub fn fail(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            answer: String::new(),
            sources: Vec::new(),
            error_message: Some(message.into()),
            failure_kind: Some(kind),
        }
    }
}

/// Stable category tags for user-visible failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    FileTooLarge,
    UnsupportedFormat,
    InvalidUrl,
    NoContent,
    ApiError,
    ProcessingError,
}

/// The only value the pipeline returns across the transport boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Final formatted message, ready to render.
    Success(String),
    /// Category tag plus a short user-safe detail.
    Failure(FailureCategory, String),
}

/// What the transport layer delivers into the pipeline. Binary modalities
/// carry a local path the transport already downloaded.
#[derive(Debug, Clone)]
pub enum IncomingContent {
    Text { body: String },
    Image { path: PathBuf },
    Video { path: PathBuf },
    Audio { path: PathBuf },
    Link { body: String },
}

impl IncomingContent {
    pub fn kind(&self) -> ContentKind {
        match self {
            IncomingContent::Text { .. } => ContentKind::Text,
            IncomingContent::Image { .. } => ContentKind::Image,
            IncomingContent::Video { .. } => ContentKind::Video,
            IncomingContent::Audio { .. } => ContentKind::Audio,
            IncomingContent::Link { .. } => ContentKind::Link,
        }
    }

    /// Local temp file backing this item, if any.
    pub fn local_path(&self) -> Option<&std::path::Path> {
        match self {
            IncomingContent::Image { path }
            | IncomingContent::Video { path }
            | IncomingContent::Audio { path } => Some(path),
            _ => None,
        }
    }
}
