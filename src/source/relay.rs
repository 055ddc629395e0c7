//! HTTP fetcher that retrieves sources through the cross-origin relay.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{proxy, Fetch};
use crate::config::{FETCH_TIMEOUT, RELAY_ENDPOINT, USER_AGENT};
use crate::error::FetchError;

/// JSON body returned by the relay.  `contents` holds the original document;
/// it is `null` when the relay could not reach the origin.
#[derive(Debug, Deserialize)]
struct Envelope {
    contents: Option<String>,
}

/// [`Fetch`] implementation backed by [`reqwest`].
pub struct RelayFetcher {
    client: Client,
    endpoint: String,
}

impl RelayFetcher {
    /// Fetcher for the default relay.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_endpoint(RELAY_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl Fetch for RelayFetcher {
    async fn fetch(&self, source_url: &str) -> Result<String, FetchError> {
        let request_url = proxy::request_url(&self.endpoint, source_url);

        let body = self
            .client
            .get(&request_url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| FetchError::from_transport(source_url, e))?
            .bytes()
            .await
            .map_err(|e| FetchError::from_transport(source_url, e))?;

        let envelope: Envelope =
            serde_json::from_slice(&body).map_err(|e| FetchError::parsing(source_url, e))?;

        envelope
            .contents
            .ok_or_else(|| FetchError::network(source_url, "relay returned no contents"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn envelope_with_contents() {
        let envelope: Envelope =
            serde_json::from_str(r#"{"contents":"<rss/>","status":{"http_code":200}}"#).unwrap();
        assert_eq!(envelope.contents.as_deref(), Some("<rss/>"));
    }

    #[test]
    fn envelope_with_null_contents() {
        let envelope: Envelope =
            serde_json::from_str(r#"{"contents":null,"status":{"error":{}}}"#).unwrap();
        assert!(envelope.contents.is_none());
    }

    #[tokio::test]
    async fn unreachable_relay_is_a_network_error() {
        // Port 9 (discard) on loopback is not expected to accept connections.
        let fetcher = RelayFetcher::with_endpoint("http://127.0.0.1:9").unwrap();
        let err = fetcher.fetch("https://example.com/rss").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(err.url(), "https://example.com/rss");
    }

    #[tokio::test]
    async fn malformed_relay_url_is_unclassified() {
        let fetcher = RelayFetcher::with_endpoint("not a url").unwrap();
        let err = fetcher.fetch("https://example.com/rss").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Unclassified);
    }
}
