//! End-to-end pipeline: seed URL → feed URL → parsed feed → keys → events.

use crate::config::{Config, ConfigError};
use crate::event::{build_note_event_at, build_profile_event_at, Event};
use crate::feed::{FeedCache, FeedFetcher, FeedResolver, FetchError};
use crate::identity::{FeedKeys, IdentityDeriver};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use thiserror::Error;

/// Errors from a single feed check.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The seed URL is not a feed and does not link to one
    #[error("no feed found at {0}")]
    NotFound(String),
    /// The resolved feed could not be fetched or parsed
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// Configuration is incomplete
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    Client(reqwest::Error),
}

/// Unsigned events for one feed, all authored by the same derived key.
#[derive(Debug, Clone)]
pub struct FeedBatch {
    /// Canonical feed URL the identity was derived from
    pub feed_url: String,
    /// Hex x-only public key of the feed
    pub pubkey: String,
    /// Kind-0 profile describing the feed
    pub profile: Event,
    /// One kind-1 note per item, in feed order
    pub notes: Vec<Event>,
}

/// Outcome of checking one seed URL in [`FeedBridge::check_all`].
#[derive(Debug)]
pub struct CheckResult {
    pub seed: String,
    pub result: Result<FeedBatch, BridgeError>,
}

/// Shared services behind every feed check.
///
/// Built once at startup; clones share the HTTP client, the feed cache and
/// the identity secret.
#[derive(Clone)]
pub struct FeedBridge {
    resolver: FeedResolver,
    fetcher: FeedFetcher,
    deriver: Arc<IdentityDeriver>,
    concurrency: usize,
}

impl FeedBridge {
    pub fn new(resolver: FeedResolver, fetcher: FeedFetcher, deriver: IdentityDeriver) -> Self {
        Self {
            resolver,
            fetcher,
            deriver: Arc::new(deriver),
            concurrency: 10,
        }
    }

    /// Wires the services up from configuration.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::Config`] if no secret is configured
    /// - [`BridgeError::Client`] if the HTTP client cannot be built
    pub fn from_config(config: &Config) -> Result<Self, BridgeError> {
        let secret = config.secret()?;
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(BridgeError::Client)?;

        let cache = Arc::new(FeedCache::with_limits(
            config.cache_capacity,
            config.cache_ttl(),
        ));
        let resolver = FeedResolver::new(client.clone()).with_timeout(config.timeout());
        let fetcher = FeedFetcher::new(client, cache).with_timeout(config.timeout());

        Ok(Self::new(resolver, fetcher, IdentityDeriver::new(secret))
            .with_concurrency(config.concurrency))
    }

    /// Maximum number of seeds [`check_all`](Self::check_all) works on at
    /// once (minimum 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn resolver(&self) -> &FeedResolver {
        &self.resolver
    }

    pub fn fetcher(&self) -> &FeedFetcher {
        &self.fetcher
    }

    /// Keys for an already-resolved feed URL.
    pub fn derive(&self, feed_url: &str) -> FeedKeys {
        self.deriver.derive(feed_url)
    }

    /// Runs the whole pipeline for one seed URL.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::NotFound`] when resolution finds no feed
    /// - [`BridgeError::Fetch`] when the resolved feed cannot be fetched or
    ///   parsed
    pub async fn check(&self, seed: &str) -> Result<FeedBatch, BridgeError> {
        let feed_url = self
            .resolver
            .resolve(seed)
            .await
            .ok_or_else(|| BridgeError::NotFound(seed.to_owned()))?;

        let feed = self.fetcher.fetch_feed(&feed_url).await?;
        let keys = self.deriver.derive(&feed_url);

        // One clock reading so undated items in a batch share a timestamp
        let now = Utc::now();
        let profile = build_profile_event_at(&keys, &feed, now);
        let notes = feed
            .items
            .iter()
            .map(|item| build_note_event_at(&keys, item, now))
            .collect();

        Ok(FeedBatch {
            feed_url,
            pubkey: keys.public_key_hex(),
            profile,
            notes,
        })
    }

    /// Checks many seeds concurrently.
    ///
    /// Results come back in completion order, not input order. A failing seed
    /// is logged and reported in its own [`CheckResult`]; it never affects the
    /// others.
    pub async fn check_all<I>(&self, seeds: I) -> Vec<CheckResult>
    where
        I: IntoIterator<Item = String>,
    {
        let results: Vec<CheckResult> = stream::iter(seeds)
            .map(|seed| async move {
                let result = self.check(&seed).await;
                if let Err(e) = &result {
                    tracing::warn!(seed = %seed, error = %e, "Feed check failed");
                }
                CheckResult { seed, result }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let failed = results.iter().filter(|r| r.result.is_err()).count();
        tracing::info!(
            total = results.len(),
            failed = failed,
            "Finished checking feeds"
        );

        results
    }
}
