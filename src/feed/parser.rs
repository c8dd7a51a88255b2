use super::types::{FeedItem, ParsedFeed};
use crate::util::strip_control_chars;
use anyhow::Result;
use feed_rs::model::{Feed, Link};
use feed_rs::parser;

/// Parses RSS, Atom or JSON Feed bytes into a [`ParsedFeed`].
///
/// The format is sniffed from the document itself, so callers never need to
/// pass a content type.
pub fn parse_feed(bytes: &[u8]) -> Result<ParsedFeed> {
    let feed = parser::parse(bytes)?;
    Ok(into_parsed(feed))
}

fn into_parsed(feed: Feed) -> ParsedFeed {
    let title = feed
        .title
        .map(|t| clean(&t.content))
        .unwrap_or_default();
    let description = feed
        .description
        .map(|d| sanitize(&d.content))
        .unwrap_or_default();
    let link = site_link(&feed.links);
    let image = feed.logo.or(feed.icon).map(|img| img.uri);

    let items = feed
        .entries
        .into_iter()
        .map(|entry| FeedItem {
            title: entry
                .title
                .map(|t| clean(&t.content))
                .filter(|t| !t.is_empty()),
            description: entry
                .summary
                .map(|s| sanitize(&s.content))
                .unwrap_or_default(),
            content: entry.content.and_then(|c| c.body).unwrap_or_default(),
            link: entry
                .links
                .first()
                .map(|l| l.href.clone())
                .unwrap_or_default(),
            updated: entry.updated,
            published: entry.published,
        })
        .collect();

    ParsedFeed {
        title,
        description,
        link,
        image,
        published: feed.published,
        items,
    }
}

/// Picks the website link: the first link that is not the feed's own
/// `rel="self"` URL, falling back to the first link of any kind.
fn site_link(links: &[Link]) -> Option<String> {
    links
        .iter()
        .find(|link| link.rel.as_deref() != Some("self"))
        .or_else(|| links.first())
        .map(|link| link.href.clone())
}

/// Titles are trimmed so a whitespace-only title counts as missing.
fn clean(s: &str) -> String {
    strip_control_chars(s.trim()).into_owned()
}

/// Descriptions keep their surrounding whitespace; notes carry them verbatim.
fn sanitize(s: &str) -> String {
    strip_control_chars(s).into_owned()
}
