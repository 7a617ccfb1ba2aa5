//! Finds URLs in free text and validates them.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;
use url::Url;

use super::error::{MAX_URL_LENGTH, ParseError, SUPPORTED_SCHEMES};

#[allow(clippy::expect_used)]
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    // Stops at whitespace, angle brackets and quotes so URLs embedded in HTML
    // or markdown come out clean.
    Regex::new(r#"(?i)\b[a-z][a-z0-9+.-]*://[^\s<>"'\]]+"#).expect("URL regex is valid") // Static pattern, safe to panic
});

/// Every URL-looking token in `line`, validated and normalized, in order.
pub(crate) fn find_urls(line: &str) -> Vec<Result<String, ParseError>> {
    URL_PATTERN
        .find_iter(line)
        .map(|found| {
            let candidate = trim_trailing_punctuation(found.as_str());
            trace!(url = candidate, "URL candidate");
            validate(candidate)
        })
        .collect()
}

/// Drops sentence punctuation and unbalanced closing brackets from the end.
fn trim_trailing_punctuation(raw: &str) -> &str {
    let mut end = raw;
    loop {
        let Some(last) = end.chars().last() else {
            return end;
        };
        let trimmed = match last {
            '.' | ',' | ';' | ':' | '!' | '?' => true,
            ')' => count(end, ')') > count(end, '('),
            ']' => count(end, ']') > count(end, '['),
            _ => false,
        };
        if !trimmed {
            return end;
        }
        end = &end[..end.len() - last.len_utf8()];
    }
}

fn count(text: &str, needle: char) -> usize {
    text.chars().filter(|&c| c == needle).count()
}

fn validate(raw: &str) -> Result<String, ParseError> {
    if raw.len() > MAX_URL_LENGTH {
        return Err(ParseError::too_long(raw));
    }
    let parsed = Url::parse(raw).map_err(|e| ParseError::Malformed {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if !SUPPORTED_SCHEMES.contains(&parsed.scheme()) {
        return Err(ParseError::UnsupportedScheme {
            url: raw.to_string(),
            scheme: parsed.scheme().to_string(),
        });
    }
    if parsed.host().is_none() {
        return Err(ParseError::MissingHost {
            url: raw.to_string(),
        });
    }
    Ok(parsed.into())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_find_urls_in_prose() {
        let found = find_urls("grab https://example.com/a.zip, then ftp://mirror.example.org/b.iso.");
        let urls: Vec<_> = found.into_iter().map(Result::unwrap).collect();
        assert_eq!(
            urls,
            vec!["https://example.com/a.zip", "ftp://mirror.example.org/b.iso"]
        );
    }

    #[test]
    fn test_find_urls_normalizes_host_only_url() {
        let found = find_urls("https://Example.com");
        assert_eq!(found[0].as_deref().unwrap(), "https://example.com/");
    }

    #[test]
    fn test_balanced_parentheses_survive() {
        assert_eq!(
            trim_trailing_punctuation("https://en.wikipedia.org/wiki/Rust_(language)"),
            "https://en.wikipedia.org/wiki/Rust_(language)"
        );
        assert_eq!(
            trim_trailing_punctuation("https://example.com/x.pdf)."),
            "https://example.com/x.pdf"
        );
    }

    #[test]
    fn test_rejects_unsupported_scheme() {
        let found = find_urls("see file://localhost/etc/hosts");
        assert!(matches!(
            found[0],
            Err(ParseError::UnsupportedScheme { ref scheme, .. }) if scheme == "file"
        ));
    }

    #[test]
    fn test_rejects_over_long_url() {
        let long = format!("https://example.com/{}", "x".repeat(MAX_URL_LENGTH));
        assert!(matches!(validate(&long), Err(ParseError::TooLong { .. })));
    }

    #[test]
    fn test_rejects_missing_host() {
        assert!(matches!(
            validate("https://"),
            Err(ParseError::Malformed { .. } | ParseError::MissingHost { .. })
        ));
    }
}
