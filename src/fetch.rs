//! Page retrieval: a shared reqwest client, retry with exponential backoff,
//! and a bounded-concurrency batch fetch that streams results back as they
//! arrive.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

const CONCURRENCY: usize = 8;
const MAX_RETRIES: u32 = 3;
const BASE_BACKOFF_MS: u64 = 1500;
const USER_AGENT: &str = concat!("wiki_scraper/", env!("CARGO_PKG_VERSION"));

pub fn client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .build()
        .context("failed to build HTTP client")
}

/// A successfully retrieved page. `url` is the final URL after redirects.
pub struct Page {
    pub url: String,
    pub status: u16,
    pub body: String,
    pub latency_ms: u64,
}

/// One result from a batch fetch; errors are captured per page instead of
/// aborting the batch.
pub struct FetchedPage {
    pub slug: String,
    pub url: String,
    pub html: Option<String>,
    pub error: Option<String>,
}

/// GET a page, retrying on rate limits, server errors and timeouts.
pub async fn get_page(
    client: &reqwest::Client,
    url: &str,
    params: &[(String, String)],
) -> Result<Page> {
    let mut attempt = 0;
    loop {
        match try_get(client, url, params).await {
            Ok(page) => return Ok(page),
            Err(e) if attempt < MAX_RETRIES && retryable(&e) => {
                let backoff = Duration::from_millis(BASE_BACKOFF_MS * 2u64.pow(attempt));
                warn!(
                    "GET {} failed ({}), attempt {}/{}, backing off {:.1}s",
                    url,
                    e,
                    attempt + 1,
                    MAX_RETRIES,
                    backoff.as_secs_f64()
                );
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// GET a page and keep only the body.
pub async fn get_html(client: &reqwest::Client, url: &str) -> Result<String> {
    Ok(get_page(client, url, &[]).await?.body)
}

async fn try_get(
    client: &reqwest::Client,
    url: &str,
    params: &[(String, String)],
) -> Result<Page> {
    let start = Instant::now();
    let mut request = client.get(url);
    if !params.is_empty() {
        request = request.query(&params);
    }
    let response = request
        .send()
        .await
        .with_context(|| format!("GET {url}"))?;
    let status = response.status();
    let final_url = response.url().to_string();
    let body = response
        .error_for_status()
        .with_context(|| format!("GET {url}"))?
        .text()
        .await
        .with_context(|| format!("reading body of {url}"))?;
    let latency_ms = start.elapsed().as_millis() as u64;
    debug!("GET {} -> {} ({} bytes, {} ms)", url, status, body.len(), latency_ms);
    Ok(Page {
        url: final_url,
        status: status.as_u16(),
        body,
        latency_ms,
    })
}

// Retry classes: rate limiting, transient server errors, client-side
// timeouts.
fn retryable(e: &anyhow::Error) -> bool {
    let msg = format!("{e:#}");
    ["429", "500", "502", "503", "timed out"]
        .iter()
        .any(|needle| msg.contains(needle))
}

/// Fetch many pages with bounded concurrency, reporting progress. Results
/// come back in input order; per-page failures are recorded, not raised.
pub async fn fetch_many(
    client: &reqwest::Client,
    targets: Vec<(String, String)>,
) -> Result<Vec<FetchedPage>> {
    let total = targets.len();
    let semaphore = Arc::new(Semaphore::new(CONCURRENCY));

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    let (tx, mut rx) = tokio::sync::mpsc::channel::<(usize, FetchedPage)>(CONCURRENCY * 2);

    for (idx, (slug, url)) in targets.into_iter().enumerate() {
        let client = client.clone();
        let sem = Arc::clone(&semaphore);
        let tx = tx.clone();

        tokio::spawn(async move {
            let _permit = sem.acquire().await.unwrap();
            let page = match get_page(&client, &url, &[]).await {
                Ok(page) => FetchedPage {
                    slug,
                    url,
                    html: Some(page.body),
                    error: None,
                },
                Err(e) => {
                    warn!("fetch failed for {}: {:#}", slug, e);
                    FetchedPage {
                        slug,
                        url,
                        html: None,
                        error: Some(format!("{e:#}")),
                    }
                }
            };
            let _ = tx.send((idx, page)).await;
        });
    }

    // Drop our copy so rx closes when all spawned tasks finish
    drop(tx);

    let mut results = Vec::with_capacity(total);
    while let Some(entry) = rx.recv().await {
        results.push(entry);
        pb.inc(1);
    }
    pb.finish_and_clear();

    results.sort_by_key(|(idx, _)| *idx);
    Ok(results.into_iter().map(|(_, page)| page).collect())
}

/// Name a page after the last segment of its URL path, for artifact files.
pub fn page_slug(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("page")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_is_the_last_path_segment() {
        assert_eq!(page_slug("https://en.wikipedia.org/wiki/Linus_Pauling"), "Linus_Pauling");
        assert_eq!(page_slug("https://en.wikipedia.org/wiki/Rafael_Nadal/"), "Rafael_Nadal");
        assert_eq!(
            page_slug("https://en.wikipedia.org/w/index.php?title=Main_Page&action=info"),
            "index.php"
        );
    }

    #[test]
    fn retryable_picks_out_transient_failures() {
        assert!(retryable(&anyhow::anyhow!("HTTP status server error (503 Service Unavailable)")));
        assert!(retryable(&anyhow::anyhow!("operation timed out")));
        assert!(!retryable(&anyhow::anyhow!("HTTP status client error (404 Not Found)")));
    }
}
