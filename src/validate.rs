//! Admission checks for candidate source URLs.

use crate::error::ValidationError;

/// Validate a user-entered source URL against the already tracked ones.
///
/// Returns the trimmed URL on success.  Only absolute `http`/`https` URLs are
/// accepted, and a URL equal to one in `tracked` is a duplicate.
pub fn validate_source<'a, I>(candidate: &str, tracked: I) -> Result<String, ValidationError>
where
    I: IntoIterator<Item = &'a str>,
{
    let candidate = candidate.trim();
    let parsed =
        url::Url::parse(candidate).map_err(|e| ValidationError::Invalid(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(ValidationError::UnsupportedScheme(scheme.to_string())),
    }
    if parsed.host().is_none() {
        return Err(ValidationError::Invalid("URL has no host".to_string()));
    }

    if tracked.into_iter().any(|url| url == candidate) {
        return Err(ValidationError::Duplicate);
    }

    Ok(candidate.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: [&str; 0] = [];

    #[test]
    fn accepts_http_and_https() {
        assert_eq!(
            validate_source("https://example.com/rss", NONE),
            Ok("https://example.com/rss".to_string())
        );
        assert!(validate_source("http://example.com/feed.xml", NONE).is_ok());
    }

    #[test]
    fn trims_whitespace() {
        assert_eq!(
            validate_source("  https://example.com/rss\n", NONE),
            Ok("https://example.com/rss".to_string())
        );
    }

    #[test]
    fn rejects_non_urls() {
        assert!(matches!(
            validate_source("not a url", NONE),
            Err(ValidationError::Invalid(_))
        ));
        assert!(matches!(validate_source("", NONE), Err(ValidationError::Invalid(_))));
    }

    #[test]
    fn rejects_other_schemes() {
        assert_eq!(
            validate_source("ftp://example.com/rss", NONE),
            Err(ValidationError::UnsupportedScheme("ftp".to_string()))
        );
        assert!(matches!(
            validate_source("mailto:someone@example.com", NONE),
            Err(ValidationError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn rejects_tracked_duplicates() {
        let tracked = ["https://a.example/rss", "https://b.example/rss"];
        assert_eq!(
            validate_source(" https://b.example/rss ", tracked),
            Err(ValidationError::Duplicate)
        );
        assert!(validate_source("https://c.example/rss", tracked).is_ok());
    }
}
