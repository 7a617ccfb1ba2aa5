//! Errors raised while turning raw input into candidates.

use thiserror::Error;

/// Longest URL accepted as a candidate.
pub const MAX_URL_LENGTH: usize = 2000;

/// Schemes a candidate URL may use.
pub const SUPPORTED_SCHEMES: &[&str] = &["http", "https", "ftp"];

/// A URL found in the input that cannot become a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unsupported scheme '{scheme}' in {url}")]
    UnsupportedScheme { url: String, scheme: String },

    #[error("malformed URL {url}: {reason}")]
    Malformed { url: String, reason: String },

    #[error("URL has no host: {url}")]
    MissingHost { url: String },

    /// Only a prefix of the URL is kept for display.
    #[error("URL too long ({length} chars, max {MAX_URL_LENGTH}): {preview}...")]
    TooLong { preview: String, length: usize },
}

impl ParseError {
    #[must_use]
    pub fn too_long(url: &str) -> Self {
        Self::TooLong {
            preview: url.chars().take(50).collect(),
            length: url.len(),
        }
    }

    /// The offending URL, or its preview for over-long input.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::UnsupportedScheme { url, .. }
            | Self::Malformed { url, .. }
            | Self::MissingHost { url } => url,
            Self::TooLong { preview, .. } => preview,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_long_keeps_preview_only() {
        let url = format!("https://example.com/{}", "a".repeat(3000));
        let err = ParseError::too_long(&url);
        assert_eq!(err.url().chars().count(), 50);
        assert!(err.to_string().contains("max 2000"));
    }

    #[test]
    fn test_display_names_the_url() {
        let err = ParseError::UnsupportedScheme {
            url: "file:///etc/passwd".to_string(),
            scheme: "file".to_string(),
        };
        assert_eq!(err.url(), "file:///etc/passwd");
        assert!(err.to_string().contains("'file'"));
    }
}
