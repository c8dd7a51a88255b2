//! Nostr events built from feeds and feed items.
//!
//! Events produced here are complete except for the signature: `id` is
//! already the content-addressed hash, so a signer only has to sign it with
//! the feed's [`FeedKeys`] before the event is published.

use crate::feed::{FeedItem, ParsedFeed};
use crate::identity::FeedKeys;
use crate::util::truncate_chars;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};

/// Longest note body (title + description) before truncation, in chars
pub const MAX_NOTE_CHARS: usize = 250;

/// Event kind discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kind(pub u32);

impl Kind {
    /// Profile metadata (`name`, `about`, `picture`)
    pub const METADATA: Kind = Kind(0);
    /// Short text note
    pub const TEXT_NOTE: Kind = Kind(1);
}

/// Tag wrapper preserving tag fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag(pub Vec<String>);

/// Unsigned Nostr event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Lowercase hex SHA-256 of the canonical serialization
    pub id: String,
    /// Author x-only public key (hex)
    pub pubkey: String,
    /// Unix timestamp, seconds
    pub created_at: u64,
    pub kind: Kind,
    pub tags: Vec<Tag>,
    pub content: String,
}

impl Event {
    /// Builds an event and computes its id from the other fields.
    pub fn new(
        pubkey: String,
        created_at: u64,
        kind: Kind,
        tags: Vec<Tag>,
        content: String,
    ) -> Self {
        let id = Self::compute_id(&pubkey, created_at, kind, &tags, &content);
        Self {
            id,
            pubkey,
            created_at,
            kind,
            tags,
            content,
        }
    }

    /// Hashes `[0, pubkey, created_at, kind, tags, content]` serialized as
    /// compact JSON, per NIP-01.
    pub fn compute_id(
        pubkey: &str,
        created_at: u64,
        kind: Kind,
        tags: &[Tag],
        content: &str,
    ) -> String {
        let tags: Vec<&[String]> = tags.iter().map(|t| t.0.as_slice()).collect();
        let canonical = json!([0, pubkey, created_at, kind.0, tags, content]).to_string();
        hex::encode(Sha256::digest(canonical.as_bytes()))
    }

    /// True when `id` matches the event's current fields.
    pub fn verify_id(&self) -> bool {
        self.id
            == Self::compute_id(
                &self.pubkey,
                self.created_at,
                self.kind,
                &self.tags,
                &self.content,
            )
    }
}

/// Builds the kind-0 profile event describing `feed`.
pub fn build_profile_event(keys: &FeedKeys, feed: &ParsedFeed) -> Event {
    build_profile_event_at(keys, feed, Utc::now())
}

/// Like [`build_profile_event`], with `now` used when the feed carries no
/// publication time.
///
/// Content is a JSON object with `name` (feed title), `about` (description,
/// a blank line, then the feed's link) and `picture` (image URL, omitted
/// when the feed has none).
pub fn build_profile_event_at(keys: &FeedKeys, feed: &ParsedFeed, now: DateTime<Utc>) -> Event {
    let mut metadata = Map::new();
    metadata.insert("name".to_owned(), Value::String(feed.title.clone()));
    metadata.insert(
        "about".to_owned(),
        Value::String(format!(
            "{}\n\n{}",
            feed.description,
            feed.link.as_deref().unwrap_or("")
        )),
    );
    if let Some(image) = &feed.image {
        metadata.insert("picture".to_owned(), Value::String(image.clone()));
    }

    Event::new(
        keys.public_key_hex(),
        unix_seconds(feed.published.unwrap_or(now)),
        Kind::METADATA,
        Vec::new(),
        Value::Object(metadata).to_string(),
    )
}

/// Builds the kind-1 text note for one feed item.
pub fn build_note_event(keys: &FeedKeys, item: &FeedItem) -> Event {
    build_note_event_at(keys, item, Utc::now())
}

/// Like [`build_note_event`], with `now` used when the item has neither an
/// updated nor a published time.
///
/// The note is `**title**`, a blank line and the description (title part
/// skipped when empty), cut to [`MAX_NOTE_CHARS`] with a trailing `…`, then
/// a blank line and the item link. The link is appended after truncation so
/// it always survives in full.
pub fn build_note_event_at(keys: &FeedKeys, item: &FeedItem, now: DateTime<Utc>) -> Event {
    let mut body = String::new();
    if let Some(title) = item.title.as_deref().filter(|t| !t.is_empty()) {
        body.push_str("**");
        body.push_str(title);
        body.push_str("**\n\n");
    }
    body.push_str(&item.description);

    let mut content = truncate_chars(&body, MAX_NOTE_CHARS).into_owned();
    content.push_str("\n\n");
    content.push_str(&item.link);

    // Published wins over updated when both are present
    let created_at = item.published.or(item.updated).unwrap_or(now);

    Event::new(
        keys.public_key_hex(),
        unix_seconds(created_at),
        Kind::TEXT_NOTE,
        Vec::new(),
        content,
    )
}

fn unix_seconds(t: DateTime<Utc>) -> u64 {
    u64::try_from(t.timestamp()).unwrap_or(0)
}
