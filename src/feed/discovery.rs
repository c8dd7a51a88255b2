use super::probe::FEED_MEDIA_TYPES;
use scraper::{Html, Selector};

/// Finds the feed an HTML page advertises through `<link type="...">`.
///
/// Media types are tried in [`FEED_MEDIA_TYPES`] order and the first type
/// with a matching `<link>` element decides the outcome:
///
/// - a non-empty `href` is resolved against `base_url` and returned
/// - an empty or missing `href` ends the search with `None`; lower-priority
///   types are not consulted
///
/// Types with no matching element at all fall through to the next one, so a
/// page that only advertises Atom or JSON Feed still resolves. Stopping at the
/// first media type checked, whether or not the page has it, would miss them.
pub fn find_feed_link(html: &str, base_url: &str) -> Option<String> {
    let document = Html::parse_document(html);

    for media_type in FEED_MEDIA_TYPES {
        let css = format!("link[type*='{media_type}']");
        let Ok(selector) = Selector::parse(&css) else {
            continue;
        };

        let Some(link) = document.select(&selector).next() else {
            continue;
        };

        let href = link.value().attr("href").map(str::trim).unwrap_or("");
        if href.is_empty() {
            tracing::debug!(
                base = %base_url,
                media_type = media_type,
                "Feed link has no href, giving up"
            );
            return None;
        }

        return resolve_url(href, base_url);
    }

    None
}

/// Resolves a possibly relative `href` against the page it was found on.
///
/// Hrefs that already carry an `http(s)` scheme are returned untouched.
fn resolve_url(href: &str, base_url: &str) -> Option<String> {
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_owned());
    }

    let base = url::Url::parse(base_url).ok()?;
    base.join(href).ok().map(String::from)
}
