//! Republishes RSS, Atom and JSON feeds as Nostr events.
//!
//! Every feed gets its own publishing identity, derived from one process-wide
//! secret and the feed URL, so no per-feed key ever has to be stored.
//!
//! - [`feed`] - resolve a page to its feed, fetch and parse it through a cache
//! - [`identity`] - HMAC-SHA256 key derivation per feed URL
//! - [`event`] - kind-0 profile and kind-1 note events with content-addressed ids
//! - [`bridge`] - the whole pipeline, for one seed or many
//! - [`config`] - TOML configuration
//!
//! Signing and relay delivery are left to the caller: events come out with
//! their `id` computed and ready to be signed with the feed's [`FeedKeys`].

pub mod bridge;
pub mod config;
pub mod event;
pub mod feed;
pub mod identity;
pub mod util;

pub use bridge::{BridgeError, CheckResult, FeedBatch, FeedBridge};
pub use config::{Config, ConfigError};
pub use event::{build_note_event, build_profile_event, Event, Kind, Tag};
pub use feed::{FeedCache, FeedFetcher, FeedItem, FeedResolver, FetchError, ParsedFeed};
pub use identity::{derive_identity, FeedKeys, IdentityDeriver};
