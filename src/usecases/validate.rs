//! Content validation: URL detection, size ceilings, media type checks.

use crate::domain::{ContentKind, DomainError};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use url::Url;

/// Modality-specific size ceilings, in megabytes.
#[derive(Debug, Clone, Copy)]
pub struct SizeLimits {
    pub file_mb: u64,
    pub image_mb: u64,
    pub video_mb: u64,
    pub audio_mb: u64,
}

impl Default for SizeLimits {
    fn default() -> Self {
        Self {
            file_mb: 20,
            image_mb: 10,
            video_mb: 50,
            audio_mb: 10,
        }
    }
}

impl SizeLimits {
    /// Ceiling for one modality; non-file modalities get the generic limit.
    pub fn for_kind(&self, kind: ContentKind) -> u64 {
        match kind {
            ContentKind::Image => self.image_mb,
            ContentKind::Video => self.video_mb,
            ContentKind::Audio => self.audio_mb,
            _ => self.file_mb,
        }
    }
}

/// True for an absolute http/https URL with a host.
pub fn is_valid_url(candidate: &str) -> bool {
    Url::parse(candidate)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host().is_some())
        .unwrap_or(false)
}

/// All valid http(s) URLs found in free text, in order of appearance.
pub fn extract_urls(text: &str) -> Vec<String> {
    static URL_RE: OnceLock<Regex> = OnceLock::new();
    let re = URL_RE.get_or_init(|| {
        Regex::new(r#"https?://[^\s<>"{}|\\^`\[\]]+"#).expect("url pattern is valid")
    });
    re.find_iter(text)
        .map(|m| m.as_str().to_string())
        .filter(|u| is_valid_url(u))
        .collect()
}

/// Enforce a size ceiling on a downloaded file.
pub fn validate_file_size(path: &Path, max_mb: u64) -> Result<(), DomainError> {
    let size = std::fs::metadata(path)
        .map_err(|e| DomainError::Validation(format!("stat {}: {e}", path.display())))?
        .len();
    let max_bytes = max_mb * 1024 * 1024;
    if size > max_bytes {
        return Err(DomainError::FileTooLarge(format!(
            "Fichier trop volumineux: {:.1}MB (max: {max_mb}MB)",
            size as f64 / 1024.0 / 1024.0
        )));
    }
    Ok(())
}

/// MIME type from the file path, with the extension fallback map for types
/// mime_guess does not know.
pub fn media_mime(path: &Path) -> String {
    if let Some(mime) = mime_guess::from_path(path).first() {
        return mime.to_string();
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "avi" => "video/x-msvideo",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "ogg" => "audio/ogg",
        "mp3" => "audio/mpeg",
        _ => "application/octet-stream",
    }
    .to_string()
}

/// Check that the file's MIME type matches the declared modality.
pub fn validate_media_kind(path: &Path, kind: ContentKind) -> Result<(), DomainError> {
    let mime = media_mime(path);
    let expected = match kind {
        ContentKind::Image => "image/",
        ContentKind::Video => "video/",
        ContentKind::Audio => "audio/",
        // Text and link carry no file.
        _ => return Ok(()),
    };
    if !mime.starts_with(expected) {
        return Err(DomainError::UnsupportedFormat(format!(
            "type {mime} inattendu pour un contenu {kind}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn valid_urls() {
        assert!(is_valid_url("https://example.com/article"));
        assert!(is_valid_url("http://example.com"));
        assert!(!is_valid_url("ftp://example.com"));
        assert!(!is_valid_url("example.com"));
        assert!(!is_valid_url("pas une url"));
    }

    #[test]
    fn extracts_urls_from_surrounding_words() {
        let urls = extract_urls("regarde ça https://example.com/a et http://example.org/b !");
        assert_eq!(
            urls,
            vec!["https://example.com/a", "http://example.org/b"]
        );
    }

    #[test]
    fn no_urls_in_plain_text() {
        assert!(extract_urls("aucun lien ici").is_empty());
    }

    #[test]
    fn size_ceiling_enforced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.jpg");
        std::fs::write(&path, vec![0u8; 2 * 1024 * 1024]).unwrap();

        assert!(validate_file_size(&path, 10).is_ok());
        let err = validate_file_size(&path, 1).unwrap_err();
        assert!(matches!(err, DomainError::FileTooLarge(_)));
    }

    #[test]
    fn mime_fallback_map() {
        assert_eq!(media_mime(&PathBuf::from("a.ogg")), "audio/ogg");
        assert_eq!(media_mime(&PathBuf::from("a.jpg")), "image/jpeg");
        assert_eq!(
            media_mime(&PathBuf::from("a.unknown-ext")),
            "application/octet-stream"
        );
    }

    #[test]
    fn media_kind_must_match() {
        assert!(validate_media_kind(&PathBuf::from("a.jpg"), ContentKind::Image).is_ok());
        assert!(validate_media_kind(&PathBuf::from("a.mp3"), ContentKind::Audio).is_ok());
        let err = validate_media_kind(&PathBuf::from("a.mp3"), ContentKind::Image).unwrap_err();
        assert!(matches!(err, DomainError::UnsupportedFormat(_)));
    }

    #[test]
    fn limits_per_kind() {
        let limits = SizeLimits::default();
        assert_eq!(limits.for_kind(ContentKind::Video), 50);
        assert_eq!(limits.for_kind(ContentKind::Image), 10);
        assert_eq!(limits.for_kind(ContentKind::Text), 20);
    }
}
