//! Identity assignment for feeds and posts.
//!
//! Identifiers come from one process-wide counter, so a value is never handed
//! out twice while the process runs, across feeds and posts alike.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::source::{Feed, FeedDraft, Post, PostDraft};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Identifier of a [`Feed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeedId(u64);

/// Identifier of a [`Post`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PostId(u64);

impl fmt::Display for FeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "feed-{}", self.0)
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "post-{}", self.0)
    }
}

/// Stamp a fresh id on a parsed channel fetched from `source_url`.
pub fn assign_feed_id(draft: FeedDraft, source_url: &str) -> Feed {
    Feed {
        id: FeedId(next_id()),
        source_url: source_url.to_string(),
        title: draft.title,
        description: draft.description,
        link: draft.link,
    }
}

/// Stamp a fresh id on a parsed item belonging to `feed_id`.
pub fn assign_post_id(draft: PostDraft, feed_id: FeedId) -> Post {
    Post {
        id: PostId(next_id()),
        feed_id,
        title: draft.title,
        link: draft.link,
        description: draft.description,
        published: draft.published,
    }
}
