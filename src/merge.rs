//! Folding freshly fetched posts into the known post list.
//!
//! A post is *already known* when its key under the active [`DedupPolicy`]
//! matches a post that was present before the batch arrived.  Unknown posts
//! get identities and are returned in the order the parser produced them;
//! the caller appends them, so existing posts never move.

use std::collections::HashSet;

use clap::ValueEnum;

use crate::identity::{assign_post_id, FeedId};
use crate::source::{Post, PostDraft};

/// How an incoming post is compared against known posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DedupPolicy {
    /// Match on title alone, across every feed.  Two feeds that publish a
    /// post with the same title keep only the first one seen.
    #[default]
    Title,
    /// Match on title within the same feed only.
    FeedAndTitle,
}

impl DedupPolicy {
    fn key<'a>(self, feed_id: FeedId, title: &'a str) -> (Option<FeedId>, &'a str) {
        match self {
            Self::Title => (None, title),
            Self::FeedAndTitle => (Some(feed_id), title),
        }
    }
}

/// Drafts from `incoming` that are not yet known, in their original order.
pub fn unseen(
    existing: &[Post],
    incoming: Vec<PostDraft>,
    feed_id: FeedId,
    policy: DedupPolicy,
) -> Vec<PostDraft> {
    let known: HashSet<_> = existing
        .iter()
        .map(|post| policy.key(post.feed_id, &post.title))
        .collect();

    incoming
        .into_iter()
        .filter(|draft| !known.contains(&policy.key(feed_id, &draft.title)))
        .collect()
}

/// Identify the unknown drafts of a batch fetched for `feed_id`.
///
/// Returns only the new posts; `existing` is left untouched.
pub fn merge(
    existing: &[Post],
    incoming: Vec<PostDraft>,
    feed_id: FeedId,
    policy: DedupPolicy,
) -> Vec<Post> {
    unseen(existing, incoming, feed_id, policy)
        .into_iter()
        .map(|draft| assign_post_id(draft, feed_id))
        .collect()
}
