//! RSS document parsing.
//!
//! Tree parsing is delegated to the [`rss`] crate; this module only extracts
//! the channel metadata and the items, in document order.

use chrono::{DateTime, Utc};

use super::{FeedDraft, ParsedFeed, PostDraft};
use crate::error::ParseError;

/// Parse a raw RSS document.
///
/// Fails when the text has no `<channel>` or the channel has no title.
pub fn parse(raw: &str) -> Result<ParsedFeed, ParseError> {
    let channel = rss::Channel::read_from(raw.as_bytes())?;
    parse_channel(&channel)
}

/// Extract drafts from an already-parsed [`rss::Channel`].
pub fn parse_channel(channel: &rss::Channel) -> Result<ParsedFeed, ParseError> {
    if channel.title().trim().is_empty() {
        return Err(ParseError::MissingTitle);
    }

    let feed = FeedDraft {
        title: channel.title().to_string(),
        description: channel.description().to_string(),
        link: channel.link().to_string(),
    };

    let posts = channel
        .items()
        .iter()
        .map(|item| {
            // Unparseable dates degrade to None.
            let published = item
                .pub_date()
                .and_then(|d| DateTime::parse_from_rfc2822(d).ok())
                .map(|dt| dt.with_timezone(&Utc));

            PostDraft {
                title: item.title().unwrap_or_default().to_string(),
                link: item.link().map(String::from),
                description: item.description().map(String::from),
                published,
            }
        })
        .collect();

    Ok(ParsedFeed { feed, posts })
}
