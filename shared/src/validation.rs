//! Upload validation: every endpoint gates on a fixed extension allow-list.

use std::path::Path;

/// Lowercased extension of `filename`, if any.
pub fn extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
}

/// True when the filename carries one of the allowed extensions.
pub fn has_allowed_extension(filename: &str, allowed: &[&str]) -> bool {
    match extension(filename) {
        Some(ext) => allowed.contains(&ext.as_str()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_is_lowercased() {
        assert_eq!(extension("Report.PDF"), Some("pdf".to_string()));
        assert_eq!(extension("photo.JPeG"), Some("jpeg".to_string()));
    }

    #[test]
    fn test_missing_extension() {
        assert_eq!(extension("README"), None);
        assert!(!has_allowed_extension("README", &["pdf"]));
    }

    #[test]
    fn test_allow_list() {
        assert!(has_allowed_extension("scan.pdf", &["pdf"]));
        assert!(has_allowed_extension("photo.jpeg", &["jpg", "jpeg"]));
        assert!(!has_allowed_extension("archive.zip", &["pdf"]));
        // Extension only; a dot elsewhere in the name is not enough
        assert!(!has_allowed_extension("pdf.zip", &["pdf"]));
    }
}
