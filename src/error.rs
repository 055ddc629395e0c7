//! Error taxonomy for fetching, parsing and validating feed sources.
//!
//! Every failure a fetch can produce ends up as exactly one [`FetchError`]
//! variant.  The terminal front end maps the [`ErrorKind`] to a feedback
//! message; the background poller only logs it.

use thiserror::Error;

/// Boxed underlying cause attached to a [`FetchError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Why a single fetch of a source failed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport or HTTP failure (DNS, refused connection, timeout, non-2xx).
    #[error("network error while fetching {url}: {cause}")]
    Network {
        url: String,
        #[source]
        cause: BoxError,
    },

    /// The payload was retrieved but is not a recognisable feed document.
    #[error("{url} did not return a valid feed: {cause}")]
    Parsing {
        url: String,
        #[source]
        cause: BoxError,
    },

    /// Anything that is neither a transport nor a parse failure.
    #[error("unexpected error while fetching {url}: {cause}")]
    Unclassified {
        url: String,
        #[source]
        cause: BoxError,
    },
}

/// Plain tag for a [`FetchError`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Parsing,
    Unclassified,
}

impl FetchError {
    pub fn network(url: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self::Network {
            url: url.into(),
            cause: cause.into(),
        }
    }

    pub fn parsing(url: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self::Parsing {
            url: url.into(),
            cause: cause.into(),
        }
    }

    pub fn unclassified(url: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self::Unclassified {
            url: url.into(),
            cause: cause.into(),
        }
    }

    /// Classify a transport error from the HTTP client.
    ///
    /// Errors raised while *building* the request are programming or
    /// configuration mistakes, not network conditions.
    pub fn from_transport(url: impl Into<String>, err: reqwest::Error) -> Self {
        if err.is_builder() {
            Self::unclassified(url, err)
        } else {
            Self::network(url, err)
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } => ErrorKind::Network,
            Self::Parsing { .. } => ErrorKind::Parsing,
            Self::Unclassified { .. } => ErrorKind::Unclassified,
        }
    }

    /// The source URL the failed fetch was for.
    pub fn url(&self) -> &str {
        match self {
            Self::Network { url, .. } | Self::Parsing { url, .. } | Self::Unclassified { url, .. } => {
                url
            }
        }
    }
}

/// Failure of the feed parser on a retrieved document.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("not an RSS document: {0}")]
    Document(#[from] rss::Error),

    #[error("channel has no title")]
    MissingTitle,
}

/// Rejection of a candidate source URL before it is tracked.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid URL: {0}")]
    Invalid(String),

    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("source is already tracked")]
    Duplicate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(FetchError::network("u", "down").kind(), ErrorKind::Network);
        assert_eq!(FetchError::parsing("u", "junk").kind(), ErrorKind::Parsing);
        assert_eq!(
            FetchError::unclassified("u", "bug").kind(),
            ErrorKind::Unclassified
        );
    }

    #[test]
    fn carries_source_url() {
        let err = FetchError::parsing("https://example.com/rss", "junk");
        assert_eq!(err.url(), "https://example.com/rss");
    }

    #[test]
    fn display_includes_url_and_cause() {
        let err = FetchError::network("https://example.com/rss", "connection refused");
        assert_eq!(
            err.to_string(),
            "network error while fetching https://example.com/rss: connection refused"
        );
    }

    #[test]
    fn cause_is_exposed_as_source() {
        use std::error::Error as _;

        let err = FetchError::parsing("u", ParseError::MissingTitle);
        let cause = err.source().map(|c| c.to_string());
        assert_eq!(cause.as_deref(), Some("channel has no title"));
    }

    #[test]
    fn validation_error_display() {
        assert_eq!(
            ValidationError::Duplicate.to_string(),
            "source is already tracked"
        );
        assert_eq!(
            ValidationError::UnsupportedScheme("ftp".into()).to_string(),
            "unsupported URL scheme: ftp"
        );
    }
}
