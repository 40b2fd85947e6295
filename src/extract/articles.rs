//! Outbound-link harvesting and Wikipedia-article filtering.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static BASE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z][a-z0-9+.-]*)://([A-Za-z0-9.-]+)").unwrap());
static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r##"<a\s[^>]*href=['"]([^#'"]+)['"#]"##).unwrap());
static WIKI_ARTICLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://\w+\.wikipedia\.org/[^:]*$").unwrap());

/// Absolutize an href against the page it was found on: `//host/...` gets
/// the page's scheme, `/path` gets its scheme+host, anything else is
/// already absolute.
pub fn resolve_href(page_url: &str, href: &str) -> String {
    let (scheme, base) = match BASE_URL_RE.captures(page_url) {
        Some(caps) => (caps[1].to_string(), caps[0].to_string()),
        None => (String::from("https"), String::new()),
    };
    if let Some(rest) = href.strip_prefix("//") {
        format!("{}://{}", scheme, rest)
    } else if href.starts_with('/') {
        format!("{}{}", base, href)
    } else {
        href.to_string()
    }
}

/// Every anchor target on the page, absolutized against `page_url` and
/// deduplicated in first-seen order. Fragment-only hrefs are ignored and
/// fragments are cut from the rest.
pub fn find_urls(page_url: &str, html: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();
    for caps in HREF_RE.captures_iter(html) {
        let url = resolve_href(page_url, &caps[1]);
        if seen.insert(url.clone()) {
            urls.push(url);
        }
    }
    urls
}

/// The subset of `urls` pointing at Wikipedia article pages. Links with a
/// colon in the path (File:, Category:, Special:, ...) are namespace pages,
/// not articles.
pub fn wikipedia_articles(urls: &[String]) -> Vec<String> {
    urls.iter()
        .filter(|u| WIKI_ARTICLE_RE.is_match(u))
        .cloned()
        .collect()
}
