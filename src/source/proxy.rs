//! Relay request URLs.
//!
//! Sources are not fetched directly: the relay retrieves the document on our
//! behalf and returns it wrapped in a JSON envelope.

/// Build the relay URL that retrieves `source_url` with caching disabled.
///
/// `endpoint` is the relay origin without a trailing path, e.g.
/// [`crate::config::RELAY_ENDPOINT`].
pub fn request_url(endpoint: &str, source_url: &str) -> String {
    format!(
        "{}/get?disableCache=true&url={}",
        endpoint.trim_end_matches('/'),
        urlencoding::encode(source_url)
    )
}
