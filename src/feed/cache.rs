use super::types::ParsedFeed;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

/// Maximum number of feeds held at once
pub const DEFAULT_CAPACITY: usize = 512;
/// How long a parsed feed stays fresh after insertion
pub const DEFAULT_TTL: Duration = Duration::from_secs(19 * 60);

struct CacheEntry {
    feed: Arc<ParsedFeed>,
    inserted_at: Instant,
}

/// Bounded, time-expiring map from feed URL to its last parse result.
///
/// Entries expire `ttl` after insertion (reads do not extend them) and the
/// least-recently-used entry is evicted once `capacity` is reached. Values
/// are handed out as `Arc`s so a hit never copies the feed.
///
/// The clock is `tokio::time::Instant`, which lets tests drive expiry with a
/// paused runtime clock.
///
/// # Concurrency
///
/// All state sits behind a single `Mutex` that is only held for the duration
/// of one map operation and never across an `.await`. The capacity bound is
/// enforced by the underlying `LruCache` inside that critical section.
pub struct FeedCache {
    inner: Mutex<LruCache<String, CacheEntry>>,
    ttl: Duration,
}

impl FeedCache {
    /// Creates a cache with the default limits (512 entries, 19 minutes).
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_CAPACITY, DEFAULT_TTL)
    }

    /// Creates a cache with explicit limits. A capacity of zero is treated
    /// as one.
    pub fn with_limits(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Returns the cached feed for `url`, or `None` if absent or expired.
    ///
    /// Expired entries are removed on the way out.
    pub fn get(&self, url: &str) -> Option<Arc<ParsedFeed>> {
        let mut cache = self.lock();

        match cache.get(url) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                return Some(Arc::clone(&entry.feed));
            }
            Some(_) => {}
            None => return None,
        }

        tracing::debug!(url = %url, "Feed cache entry expired");
        cache.pop(url);
        None
    }

    /// Stores `feed` under `url`, replacing any previous entry and restarting
    /// its freshness window.
    pub fn put(&self, url: &str, feed: Arc<ParsedFeed>) {
        let entry = CacheEntry {
            feed,
            inserted_at: Instant::now(),
        };
        if let Some((evicted, _)) = self.lock().push(url.to_owned(), entry) {
            if evicted != url {
                tracing::trace!(url = %evicted, "Evicted feed from cache");
            }
        }
    }

    /// Number of entries currently held, including ones that have expired
    /// but not yet been read.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panic while holding the lock cannot leave the LruCache half-updated
    // from our side, so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, LruCache<String, CacheEntry>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for FeedCache {
    fn default() -> Self {
        Self::new()
    }
}
