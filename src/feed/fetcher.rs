use super::body::{read_limited, BodyError};
use super::cache::FeedCache;
use super::parser::parse_feed;
use super::resolver::DEFAULT_TIMEOUT;
use super::types::ParsedFeed;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors that can occur while fetching and parsing a feed.
///
/// None of these are retried here; the caller decides what a failure means
/// for the feed's subscription.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// No complete response within the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// Document could not be parsed as RSS, Atom or JSON Feed
    #[error("Parse error: {0}")]
    Parse(String),
    /// Response body exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
}

impl From<BodyError> for FetchError {
    fn from(e: BodyError) -> Self {
        match e {
            BodyError::TooLarge => FetchError::ResponseTooLarge,
            BodyError::Network(e) => FetchError::Network(e),
        }
    }
}

/// Fetches feed documents through a shared [`FeedCache`].
///
/// Cheap to clone: the HTTP client and the cache are both shared handles, so
/// every clone sees the same cached feeds.
#[derive(Clone)]
pub struct FeedFetcher {
    client: reqwest::Client,
    cache: Arc<FeedCache>,
    timeout: Duration,
}

impl FeedFetcher {
    pub fn new(client: reqwest::Client, cache: Arc<FeedCache>) -> Self {
        Self {
            client,
            cache,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the per-request timeout (default 5 seconds).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn cache(&self) -> &Arc<FeedCache> {
        &self.cache
    }

    /// Returns the parsed feed at `url`, from cache when still fresh.
    ///
    /// On a miss the document is downloaded and parsed, item bodies are
    /// dropped, and the stripped feed is cached and returned. Every caller,
    /// hit or miss, therefore sees the same content-free items.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Timeout`] - no complete response within the timeout
    /// - [`FetchError::Network`] - connection or TLS errors
    /// - [`FetchError::HttpStatus`] - non-2xx HTTP response
    /// - [`FetchError::ResponseTooLarge`] - body exceeded 10MB
    /// - [`FetchError::Parse`] - not a valid RSS/Atom/JSON feed
    ///
    /// Nothing is cached when an error is returned.
    pub async fn fetch_feed(&self, url: &str) -> Result<Arc<ParsedFeed>, FetchError> {
        if let Some(feed) = self.cache.get(url) {
            tracing::debug!(url = %url, "Feed cache hit");
            return Ok(feed);
        }

        let bytes = self.download(url).await?;
        let parsed = parse_feed(&bytes).map_err(|e| FetchError::Parse(e.to_string()))?;

        let feed = Arc::new(parsed.without_content());
        self.cache.put(url, Arc::clone(&feed));

        tracing::debug!(url = %url, items = feed.items.len(), "Fetched and cached feed");
        Ok(feed)
    }

    /// Downloads `url` with a single deadline covering the request, the
    /// status check and the whole body.
    async fn download(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        tokio::time::timeout(self.timeout, self.get_body(url))
            .await
            .map_err(|_| FetchError::Timeout)?
    }

    async fn get_body(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status().as_u16()));
        }

        Ok(read_limited(response, MAX_FEED_SIZE).await?)
    }
}
