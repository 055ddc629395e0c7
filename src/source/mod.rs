//! Retrieving and parsing feed sources.
//!
//! [`Fetch`] is the seam between the polling engine and the network: it
//! retrieves the raw document of a source.  [`fetch_feed`] runs one full
//! attempt (retrieve, then parse) and classifies any failure into a
//! [`FetchError`].
//!
//! The production implementation is [`RelayFetcher`], which goes through the
//! cross-origin relay built by [`proxy::request_url`].  Tests substitute an
//! in-memory implementation.

mod model;
pub mod proxy;
mod relay;
pub mod rss;

pub use model::{Feed, FeedDraft, ParsedFeed, Post, PostDraft, TrackedSource};
pub use relay::RelayFetcher;

use async_trait::async_trait;

use crate::error::FetchError;

/// Retrieves the raw document of a feed source.
///
/// Called concurrently for every tracked source, so implementations must be
/// shareable across tasks.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Return the document text of `source_url`, or a classified failure.
    async fn fetch(&self, source_url: &str) -> Result<String, FetchError>;
}

/// One retrieval attempt of `source_url`, parsed into drafts.
pub async fn fetch_feed(fetcher: &dyn Fetch, source_url: &str) -> Result<ParsedFeed, FetchError> {
    let raw = fetcher.fetch(source_url).await?;
    rss::parse(&raw).map_err(|e| FetchError::parsing(source_url, e))
}
