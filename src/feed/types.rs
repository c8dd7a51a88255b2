use chrono::{DateTime, Utc};

/// A feed document reduced to the fields the event builder needs.
///
/// Produced by [`parse_feed`](super::parse_feed). Copies that live in the
/// [`FeedCache`](super::FeedCache) always have every item's `content`
/// emptied; see [`ParsedFeed::without_content`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFeed {
    /// Feed title (empty when the document has none)
    pub title: String,
    /// Feed description / subtitle (empty when absent)
    pub description: String,
    /// Website the feed belongs to, if the document names one
    pub link: Option<String>,
    /// Logo or icon URL
    pub image: Option<String>,
    /// Channel-level publication time
    pub published: Option<DateTime<Utc>>,
    /// Entries in document order
    pub items: Vec<FeedItem>,
}

/// One entry of a [`ParsedFeed`].
#[derive(Debug, Clone, PartialEq)]
pub struct FeedItem {
    pub title: Option<String>,
    /// Short description or summary; what ends up in the note
    pub description: String,
    /// Full body. Heavy, and never needed downstream, so it is dropped
    /// before caching.
    pub content: String,
    /// Permalink (empty when the entry has no link)
    pub link: String,
    pub updated: Option<DateTime<Utc>>,
    pub published: Option<DateTime<Utc>>,
}

impl ParsedFeed {
    /// Returns a copy with every item's `content` cleared.
    ///
    /// `self` is left untouched so a caller holding the full parse result
    /// keeps it independent of what gets cached.
    pub fn without_content(&self) -> ParsedFeed {
        ParsedFeed {
            items: self
                .items
                .iter()
                .map(|item| FeedItem {
                    content: String::new(),
                    ..item.clone()
                })
                .collect(),
            ..self.clone()
        }
    }
}
