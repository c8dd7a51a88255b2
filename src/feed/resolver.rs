use super::body::{read_limited, BodyError};
use super::discovery::find_feed_link;
use super::probe::{try_probe, Probe};
use std::time::Duration;
use thiserror::Error;

/// Timeout applied to every request the resolver and fetcher make
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_HTML_SIZE: usize = 5 * 1024 * 1024; // 5MB

/// Errors that can occur while resolving a feed URL.
///
/// [`FeedResolver::resolve`] folds all of these into `None`; they are only
/// visible through [`FeedResolver::try_resolve`].
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Connection, DNS or TLS failure
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    /// The server answered with a status of 300 or above
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// No response within the configured timeout
    #[error("request timed out")]
    Timeout,
    /// HTML page exceeded the 5MB size limit
    #[error("response too large")]
    TooLarge,
}

impl From<BodyError> for ResolveError {
    fn from(e: BodyError) -> Self {
        match e {
            BodyError::TooLarge => ResolveError::TooLarge,
            BodyError::Network(e) => ResolveError::Network(e),
        }
    }
}

/// Turns an arbitrary page or feed URL into the URL of the feed itself.
///
/// Resolution is a bounded chain: a HEAD fingerprint of the seed URL, then,
/// only if it serves HTML, one GET of that page and a scan of its `<link>`
/// elements. Nothing is retried.
#[derive(Debug, Clone)]
pub struct FeedResolver {
    client: reqwest::Client,
    timeout: Duration,
}

impl FeedResolver {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the per-request timeout (default 5 seconds).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolves `seed` to a feed URL, or `None` if no feed could be found.
    ///
    /// Network and parse failures are logged at `debug` and reported as
    /// `None`; they never affect other resolutions.
    pub async fn resolve(&self, seed: &str) -> Option<String> {
        match self.try_resolve(seed).await {
            Ok(found) => found,
            Err(e) => {
                tracing::debug!(url = %seed, error = %e, "Feed resolution failed");
                None
            }
        }
    }

    /// Resolves `seed`, keeping transport failures distinct from a plain
    /// "no feed here".
    ///
    /// Returns `Ok(None)` when the seed is reachable but neither is a feed
    /// nor links to one.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] when the HEAD probe or the HTML fetch fails.
    pub async fn try_resolve(&self, seed: &str) -> Result<Option<String>, ResolveError> {
        match try_probe(&self.client, seed, self.timeout).await? {
            Probe::Feed(url) => Ok(Some(url)),
            Probe::NotAFeed => Ok(None),
            Probe::Html => {
                let html = self.fetch_html(seed).await?;
                let found = find_feed_link(&html, seed);
                if let Some(url) = &found {
                    tracing::debug!(seed = %seed, feed = %url, "Found feed link in HTML");
                }
                Ok(found)
            }
        }
    }

    /// GETs the seed page under one deadline for the request, the status
    /// check and the whole body.
    async fn fetch_html(&self, url: &str) -> Result<String, ResolveError> {
        let bytes = tokio::time::timeout(self.timeout, self.get_html_bytes(url))
            .await
            .map_err(|_| ResolveError::Timeout)??;

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn get_html_bytes(&self, url: &str) -> Result<Vec<u8>, ResolveError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(ResolveError::HttpStatus(response.status().as_u16()));
        }

        Ok(read_limited(response, MAX_HTML_SIZE).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::body::stalling_server;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE_WITH_RSS: &str = r#"<html><head>
        <link rel="alternate" type="application/rss+xml" href="/feed.xml">
    </head><body><h1>My Blog</h1></body></html>"#;

    async fn html_server(body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200).insert_header("Content-Type", "text/html"))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(body)
                    .insert_header("Content-Type", "text/html; charset=utf-8"),
            )
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[tokio::test]
    async fn test_direct_feed_returned_unchanged() {
        let mock_server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/atom"))
            .respond_with(
                ResponseTemplate::new(200).insert_header("Content-Type", "application/atom+xml"),
            )
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let resolver = FeedResolver::new(reqwest::Client::new());
        let seed = format!("{}/atom", mock_server.uri());
        assert_eq!(resolver.resolve(&seed).await, Some(seed.clone()));
    }

    #[tokio::test]
    async fn test_html_page_falls_back_to_link() {
        let mock_server = html_server(PAGE_WITH_RSS).await;

        let resolver = FeedResolver::new(reqwest::Client::new());
        let seed = format!("{}/blog/post", mock_server.uri());

        assert_eq!(
            resolver.resolve(&seed).await,
            Some(format!("{}/feed.xml", mock_server.uri()))
        );
    }

    #[tokio::test]
    async fn test_html_without_link_is_none() {
        let mock_server = html_server("<html><body>Just a page</body></html>").await;

        let resolver = FeedResolver::new(reqwest::Client::new());
        assert_eq!(resolver.resolve(&mock_server.uri()).await, None);
        assert!(matches!(resolver.try_resolve(&mock_server.uri()).await, Ok(None)));
    }

    #[tokio::test]
    async fn test_404_is_none() {
        let mock_server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let resolver = FeedResolver::new(reqwest::Client::new());
        let seed = format!("{}/gone", mock_server.uri());

        assert_eq!(resolver.resolve(&seed).await, None);
        assert!(matches!(
            resolver.try_resolve(&seed).await,
            Err(ResolveError::HttpStatus(404))
        ));
    }

    #[tokio::test]
    async fn test_html_get_failure_is_none() {
        let mock_server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200).insert_header("Content-Type", "text/html"))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&mock_server)
            .await;

        let resolver = FeedResolver::new(reqwest::Client::new());
        assert_eq!(resolver.resolve(&mock_server.uri()).await, None);
    }

    #[tokio::test]
    async fn test_unrecognized_content_type_is_none() {
        let mock_server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200).insert_header("Content-Type", "image/png"))
            .mount(&mock_server)
            .await;

        let resolver = FeedResolver::new(reqwest::Client::new());
        assert_eq!(resolver.resolve(&mock_server.uri()).await, None);
    }

    #[tokio::test]
    async fn test_slow_html_times_out() {
        let mock_server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200).insert_header("Content-Type", "text/html"))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(PAGE_WITH_RSS)
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&mock_server)
            .await;

        let resolver =
            FeedResolver::new(reqwest::Client::new()).with_timeout(Duration::from_millis(200));
        assert!(matches!(
            resolver.try_resolve(&mock_server.uri()).await,
            Err(ResolveError::Timeout)
        ));
    }

    #[tokio::test]
    async fn test_html_timeout_covers_headers_and_body_together() {
        let url = stalling_server::start(
            "text/html",
            PAGE_WITH_RSS,
            Duration::from_millis(300),
            Duration::from_millis(300),
        )
        .await;

        let resolver =
            FeedResolver::new(reqwest::Client::new()).with_timeout(Duration::from_millis(450));
        assert!(matches!(
            resolver.try_resolve(&url).await,
            Err(ResolveError::Timeout)
        ));
    }

    #[tokio::test]
    async fn test_split_html_within_timeout_resolves() {
        let url = stalling_server::start(
            "text/html",
            PAGE_WITH_RSS,
            Duration::from_millis(50),
            Duration::from_millis(50),
        )
        .await;

        let resolver = FeedResolver::new(reqwest::Client::new()).with_timeout(Duration::from_secs(2));
        assert_eq!(resolver.resolve(&url).await, Some(format!("{url}/feed.xml")));
    }
}
