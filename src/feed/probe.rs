use super::resolver::ResolveError;
use std::time::Duration;

/// Media-type fragments that identify a feed, in resolution priority order.
pub const FEED_MEDIA_TYPES: [&str; 3] = ["rss+xml", "atom+xml", "feed+json"];

/// Outcome of a HEAD-only fingerprint of a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// The URL itself serves a feed
    Feed(String),
    /// The URL serves HTML that may link to a feed
    Html,
    /// Neither a feed nor HTML, or the request failed
    NotAFeed,
}

/// Fingerprints `url` with a HEAD request, treating any failure as
/// [`Probe::NotAFeed`].
///
/// Failures are logged at `debug` and never surfaced: a URL we cannot reach
/// is simply not a direct feed.
pub async fn probe(client: &reqwest::Client, url: &str, timeout: Duration) -> Probe {
    match try_probe(client, url, timeout).await {
        Ok(probe) => probe,
        Err(e) => {
            tracing::debug!(url = %url, error = %e, "Fingerprint probe failed");
            Probe::NotAFeed
        }
    }
}

/// Fingerprints `url` with a HEAD request, keeping failures typed.
///
/// # Errors
///
/// - [`ResolveError::Timeout`] if no response arrives within `timeout`
/// - [`ResolveError::Network`] on connection, DNS or TLS failure
/// - [`ResolveError::HttpStatus`] for any status of 300 or above (after
///   redirects have been followed)
pub async fn try_probe(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<Probe, ResolveError> {
    let response = tokio::time::timeout(timeout, client.head(url).send())
        .await
        .map_err(|_| ResolveError::Timeout)?
        .map_err(ResolveError::Network)?;

    if !response.status().is_success() {
        return Err(ResolveError::HttpStatus(response.status().as_u16()));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_lowercase();

    Ok(classify(url, &content_type))
}

/// Maps a lowercased Content-Type value to a [`Probe`] for `url`.
pub fn classify(url: &str, content_type: &str) -> Probe {
    if FEED_MEDIA_TYPES.iter().any(|t| content_type.contains(t)) {
        Probe::Feed(url.to_owned())
    } else if content_type.contains("text/html") {
        Probe::Html
    } else {
        Probe::NotAFeed
    }
}
