//! The aggregated view of every tracked source.
//!
//! Fields are private so the only ways to change the state are the
//! append-style methods below: sources, feeds and posts are never removed or
//! rewritten.  The engine holds the authoritative copy; the renderer keeps a
//! mirror rebuilt from engine events.

use crate::identity::FeedId;
use crate::source::{Feed, Post, TrackedSource};

#[derive(Debug, Clone, Default)]
pub struct AggregationState {
    sources: Vec<TrackedSource>,
    feeds: Vec<Feed>,
    posts: Vec<Post>,
}

impl AggregationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sources(&self) -> &[TrackedSource] {
        &self.sources
    }

    pub fn feeds(&self) -> &[Feed] {
        &self.feeds
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn is_tracked(&self, url: &str) -> bool {
        self.sources.iter().any(|s| s.url == url)
    }

    /// Start tracking `source`.  Returns `false` if it was already tracked.
    pub fn track(&mut self, source: TrackedSource) -> bool {
        if self.is_tracked(&source.url) {
            return false;
        }
        self.sources.push(source);
        true
    }

    /// The feed created for `source_url`, if it was ever fetched successfully.
    pub fn feed_for(&self, source_url: &str) -> Option<&Feed> {
        self.feeds.iter().find(|f| f.source_url == source_url)
    }

    pub fn feed(&self, id: FeedId) -> Option<&Feed> {
        self.feeds.iter().find(|f| f.id == id)
    }

    /// Record a newly created feed.  A second feed for the same source is
    /// ignored and `false` is returned.
    pub fn insert_feed(&mut self, feed: Feed) -> bool {
        if self.feed_for(&feed.source_url).is_some() {
            return false;
        }
        self.feeds.push(feed);
        true
    }

    /// Append merged posts after the existing ones.
    pub fn append_posts(&mut self, posts: impl IntoIterator<Item = Post>) {
        self.posts.extend(posts);
    }
}
