//! Feed resolution, fetching, parsing and caching.
//!
//! - **Probing**: HEAD-only Content-Type fingerprint of a URL
//! - **Discovery**: `<link>` extraction from HTML pages
//! - **Resolution**: the bounded probe → HTML → link chain
//! - **Fetching**: cached download and parse of RSS/Atom/JSON feeds
//!
//! # Architecture
//!
//! - [`probe`] - Content-Type fingerprinting with a HEAD request
//! - [`discovery`] - feed `<link>` search in HTML using `scraper`
//! - [`resolver`] - [`FeedResolver`], combining the two above
//! - [`parser`] - `feed-rs` documents reduced to [`ParsedFeed`]
//! - [`cache`] - [`FeedCache`], bounded LRU with a freshness window
//! - [`fetcher`] - [`FeedFetcher`], download + parse behind the cache
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use feedbridge::feed::{FeedCache, FeedFetcher, FeedResolver};
//!
//! let client = reqwest::Client::new();
//! let resolver = FeedResolver::new(client.clone());
//! let fetcher = FeedFetcher::new(client, Arc::new(FeedCache::new()));
//!
//! if let Some(url) = resolver.resolve("https://example.com/blog").await {
//!     let feed = fetcher.fetch_feed(&url).await?;
//!     println!("{} has {} items", feed.title, feed.items.len());
//! }
//! ```

mod body;
pub mod cache;
pub mod discovery;
pub mod fetcher;
pub mod parser;
pub mod probe;
pub mod resolver;
mod types;

pub use cache::FeedCache;
pub use discovery::find_feed_link;
pub use fetcher::{FeedFetcher, FetchError};
pub use parser::parse_feed;
pub use probe::{probe, Probe, FEED_MEDIA_TYPES};
pub use resolver::{FeedResolver, ResolveError, DEFAULT_TIMEOUT};
pub use types::{FeedItem, ParsedFeed};
