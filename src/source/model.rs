//! Entities produced by the fetch → parse → identify pipeline.
//!
//! A *draft* ([`FeedDraft`], [`PostDraft`]) is what the parser extracts from a
//! document.  It becomes a [`Feed`] or [`Post`] once
//! [`crate::identity`] stamps an identifier on it.  Both stamped types are
//! immutable after creation.

use chrono::{DateTime, Utc};

use crate::identity::{FeedId, PostId};

/// A feed endpoint the user chose to track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedSource {
    pub url: String,
}

/// Channel metadata before identity assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedDraft {
    pub title: String,
    pub description: String,
    pub link: String,
}

/// A single `<item>` before identity assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub link: Option<String>,
    pub description: Option<String>,
    /// Publication timestamp; `None` when missing or not RFC 2822.
    pub published: Option<DateTime<Utc>>,
}

/// Output of one successful parse: the channel and its items in document
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFeed {
    pub feed: FeedDraft,
    pub posts: Vec<PostDraft>,
}

/// A tracked source's channel metadata, created the first time the source is
/// fetched successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    pub id: FeedId,
    /// URL of the [`TrackedSource`] this feed was created for.
    pub source_url: String,
    pub title: String,
    pub description: String,
    pub link: String,
}

/// A post in the aggregated list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    /// Back-reference to the owning [`Feed`].
    pub feed_id: FeedId,
    pub title: String,
    pub link: Option<String>,
    pub description: Option<String>,
    pub published: Option<DateTime<Utc>>,
}

#[cfg(test)]
impl PostDraft {
    /// Shorthand for a draft that only carries a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: None,
            description: None,
            published: None,
        }
    }
}
