//! Final user-facing message assembly (single output language: French).
//!
//! Consumes the fixed field set handed over by the pipeline: summary, the
//! detected claims and the fact-check answer. Markup is Telegram-flavored
//! Markdown; rendering beyond that is the transport's concern.

use crate::domain::{ContentKind, FailureCategory};

/// Telegram message ceiling is 4096; leave headroom for markup.
const MAX_MESSAGE_LEN: usize = 4000;

/// Only the first claims are shown; the full list still drives the query.
const SHOWN_CLAIMS: usize = 3;

fn kind_emoji(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Text => "📝",
        ContentKind::Image => "🖼️",
        ContentKind::Video => "🎬",
        ContentKind::Audio => "🎵",
        ContentKind::Link => "🔗",
    }
}

/// Assemble the final success message from the pipeline's fixed field set.
pub fn fact_check_response(
    kind: ContentKind,
    summary: Option<&str>,
    claims: &[String],
    answer: &str,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} *Analyse de {kind}*\n", kind_emoji(kind)));
    out.push_str("━━━━━━━━━━━━━━━━━━━━\n");

    if let Some(summary) = summary.filter(|s| !s.is_empty()) {
        out.push_str(&format!("📋 *Contenu analysé :*\n{summary}\n\n"));
    }

    if !claims.is_empty() {
        out.push_str("🎯 *Affirmations détectées :*\n");
        for (i, claim) in claims.iter().take(SHOWN_CLAIMS).enumerate() {
            out.push_str(&format!("{}. _{claim}_\n", i + 1));
        }
        out.push('\n');
    }

    out.push_str(&format!("🔍 *Vérification factuelle :*\n{answer}\n"));
    out.push_str("\n━━━━━━━━━━━━━━━━━━━━");
    out.push_str("\n💡 _Envoyez-moi du contenu à vérifier !_");

    truncate(&out, MAX_MESSAGE_LEN)
}

/// Short category-tagged failure message. `detail` is only ever a
/// user-safe string chosen by the pipeline, never a raw internal error.
pub fn error_message(category: FailureCategory, detail: Option<&str>) -> String {
    let header = match category {
        FailureCategory::ProcessingError => "❌ *Erreur de traitement*",
        FailureCategory::FileTooLarge => "⚠️ *Fichier trop volumineux*",
        FailureCategory::InvalidUrl => "🔗 *URL invalide*",
        FailureCategory::NoContent => "🤷 *Aucune affirmation à vérifier*",
        FailureCategory::ApiError => "🔌 *Erreur API*",
        FailureCategory::UnsupportedFormat => "❌ *Format non supporté*",
    };

    let mut message = header.to_string();
    if let Some(detail) = detail.filter(|d| !d.is_empty()) {
        message.push_str(&format!("\n\n{detail}"));
    }
    message.push_str("\n\n💡 _Réessayez ou envoyez /help pour plus d'infos._");
    message
}

/// Interim "working on it" message shown while the pipeline runs.
pub fn processing_message(kind: ContentKind) -> String {
    format!("⏳ *Analyse en cours...*\n\n🔄 Traitement du {kind}...")
}

/// Cap a message at `max` characters, ellipsized.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{cut}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_contains_all_sections() {
        let claims = vec!["c1".to_string(), "c2".to_string()];
        let msg = fact_check_response(ContentKind::Text, Some("résumé"), &claims, "verdict");
        assert!(msg.contains("Analyse de texte"));
        assert!(msg.contains("résumé"));
        assert!(msg.contains("_c1_"));
        assert!(msg.contains("_c2_"));
        assert!(msg.contains("verdict"));
    }

    #[test]
    fn only_first_three_claims_shown() {
        let claims: Vec<String> = (1..=5).map(|i| format!("claim{i}")).collect();
        let msg = fact_check_response(ContentKind::Image, None, &claims, "ok");
        assert!(msg.contains("claim3"));
        assert!(!msg.contains("claim4"));
    }

    #[test]
    fn empty_summary_section_omitted() {
        let msg = fact_check_response(ContentKind::Video, Some(""), &[], "ok");
        assert!(!msg.contains("Contenu analysé"));
        assert!(!msg.contains("Affirmations détectées"));
    }

    #[test]
    fn error_message_carries_detail() {
        let msg = error_message(FailureCategory::FileTooLarge, Some("12.3MB (max: 10MB)"));
        assert!(msg.contains("Fichier trop volumineux"));
        assert!(msg.contains("12.3MB"));
    }

    #[test]
    fn error_message_without_detail() {
        let msg = error_message(FailureCategory::NoContent, None);
        assert!(msg.contains("Aucune affirmation"));
        assert!(msg.contains("/help"));
    }

    #[test]
    fn truncate_caps_length() {
        let long = "x".repeat(5000);
        let t = truncate(&long, 100);
        assert_eq!(t.chars().count(), 100);
        assert!(t.ends_with("..."));
        assert_eq!(truncate("court", 100), "court");
    }

    #[test]
    fn processing_message_names_modality() {
        assert!(processing_message(ContentKind::Audio).contains("audio"));
    }
}
