//! Section-tagged output parser shared by every analysis modality.
//!
//! The model is instructed to answer as line-delimited sections, each
//! introduced by a literal tag (`RESUME:`, `DESCRIPTION:`, ...) and a final
//! `AFFIRMATIONS:` block listing one claim per line. The per-modality
//! prompts differ; the scan logic is this one parameterized extractor.

use std::collections::HashMap;

/// Marker opening the claims block. Once seen, every subsequent non-blank
/// line is a claim, even one that resembles a tag (the flag is one-way).
pub const CLAIMS_MARKER: &str = "AFFIRMATIONS:";

/// Section tags known across modalities.
pub const TAG_RESUME: &str = "RESUME:";
pub const TAG_DESCRIPTION: &str = "DESCRIPTION:";
pub const TAG_EXTRACTED_TEXT: &str = "TEXTE_EXTRAIT:";
pub const TAG_TRANSCRIPTION: &str = "TRANSCRIPTION:";
pub const TAG_TYPE: &str = "TYPE:";
pub const TAG_SUBJECT: &str = "SUJET:";

/// Parsed model output: tag fields plus the ordered claims list.
#[derive(Debug, Default)]
pub struct Extraction {
    fields: HashMap<&'static str, String>,
    pub claims: Vec<String>,
}

impl Extraction {
    /// Value of a section tag, if the model produced it non-empty.
    pub fn field(&self, tag: &'static str) -> Option<&str> {
        self.fields.get(tag).map(String::as_str)
    }
}

/// Line scanner for one modality's tag set.
///
/// Never fails: tagless or malformed input simply leaves fields unset and
/// claims empty. Callers decide what an empty result means for their
/// modality.
pub struct ClaimExtractor {
    tags: Vec<&'static str>,
}

impl ClaimExtractor {
    /// `tags` is the ordered set of section tags this modality expects.
    /// The claims marker is implicit and always recognized.
    pub fn new(tags: &[&'static str]) -> Self {
        Self {
            tags: tags.to_vec(),
        }
    }

    pub fn extract(&self, raw: &str) -> Extraction {
        let mut out = Extraction::default();
        let mut in_claims = false;

        for line in raw.trim().lines() {
            if !in_claims {
                if line.starts_with(CLAIMS_MARKER) {
                    in_claims = true;
                    continue;
                }
                if let Some(tag) = self.tags.iter().copied().find(|t| line.starts_with(t)) {
                    // Last write wins on a repeated tag.
                    out.fields.insert(tag, line[tag.len()..].trim().to_string());
                }
                continue;
            }

            if line.trim().is_empty() {
                continue;
            }
            if let Some(claim) = strip_numbering(line.trim()) {
                out.claims.push(claim);
            }
        }

        out
    }
}

/// Strip a leading `<digit>…` numbering: split on the first `.` and keep the
/// trimmed remainder. A line without a `.` is kept as-is. Returns `None`
/// when nothing remains after stripping.
fn strip_numbering(line: &str) -> Option<String> {
    let claim = if line.starts_with(|c: char| c.is_ascii_digit()) {
        match line.split_once('.') {
            Some((_, rest)) => rest.trim(),
            None => line,
        }
    } else {
        line
    };
    if claim.is_empty() {
        None
    } else {
        Some(claim.to_string())
    }
}
