//! Crawl-based URL discovery.
//!
//! A single-threaded breadth-first crawl from the configured entry points.
//! Listing pages are fetched to find article links; article links are
//! recorded without being fetched, the extractor visits them later.
//! Requests are spaced by the configured delay to stay polite.

use crate::config::SiteConfig;
use crate::error::Result;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

pub struct Crawler {
    client: Client,
    config: SiteConfig,
    progress_callback: Option<ProgressCallback>,
}

impl Crawler {
    pub fn new(client: Client, config: SiteConfig) -> Self {
        Self {
            client,
            config,
            progress_callback: None,
        }
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Crawl the site and return the article URLs found, sorted.
    ///
    /// Only listing pages are enqueued; article links go straight to the
    /// result set. At most `max_pages` pages are fetched and the frontier
    /// is capped at twice that, so a link-dense site cannot grow the queue
    /// without bound.
    pub async fn crawl(&self) -> Result<Vec<String>> {
        let max_pages = self.config.max_pages();
        let frontier_cap = max_pages * 2;

        let mut queue: VecDeque<String> = VecDeque::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut articles: BTreeSet<String> = BTreeSet::new();

        for seed in self.config.entry_points() {
            let seed = normalize_url(&seed).unwrap_or(seed);
            if visited.insert(seed.clone()) {
                queue.push_back(seed);
            }
        }

        info!(seeds = queue.len(), max_pages, "starting crawl");

        let mut fetched = 0usize;
        while let Some(url) = queue.pop_front() {
            if fetched >= max_pages {
                debug!(max_pages, "page budget exhausted, stopping crawl");
                break;
            }

            if fetched > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.request_delay_ms())).await;
            }

            fetched += 1;
            if let Some(ref callback) = self.progress_callback {
                callback(fetched, url.clone());
            }

            if self.config.is_article_url(&url) {
                articles.insert(url.clone());
            }

            debug!(url = %url, fetched, "fetching page");
            let body = match self.fetch_html(&url).await {
                Ok(Some(body)) => body,
                Ok(None) => continue,
                Err(e) => {
                    warn!(url = %url, error = %e, "fetch failed, skipping");
                    continue;
                }
            };

            for link in collect_links(&body, &url) {
                if self.config.is_article_url(&link) {
                    articles.insert(link);
                    continue;
                }
                if !self.config.is_listing_url(&link) {
                    continue;
                }
                if queue.len() < frontier_cap && visited.insert(link.clone()) {
                    queue.push_back(link);
                }
            }
        }

        info!(fetched, articles = articles.len(), "crawl complete");
        Ok(articles.into_iter().collect())
    }

    /// Fetch a page body if it is an HTML success response.
    async fn fetch_html(&self, url: &str) -> Result<Option<String>> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            debug!(url = %url, status = %response.status(), "non-success response");
            return Ok(None);
        }

        let is_html = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("text/html"))
            .unwrap_or(false);
        if !is_html {
            return Ok(None);
        }

        Ok(Some(response.text().await?))
    }
}

/// Extract, resolve and normalize the links of one HTML page.
///
/// Synchronous on purpose: the parsed document is not `Send` and must never
/// be held across an await point.
fn collect_links(html: &str, base: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").unwrap();

    let mut links = Vec::new();
    for element in document.select(&selector) {
        if let Some(href) = element.value().attr("href")
            && let Some(resolved) = resolve_url(base, href)
        {
            links.push(resolved);
        }
    }
    links
}

fn resolve_url(base: &str, href: &str) -> Option<String> {
    if href.is_empty()
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with('#')
    {
        return None;
    }

    let base_url = Url::parse(base).ok()?;
    let resolved = base_url.join(href).ok()?;
    normalize_url(resolved.as_str())
}

/// Canonical form used for dedup: no fragment, no query, no trailing slash.
pub fn normalize_url(url: &str) -> Option<String> {
    let mut parsed = Url::parse(url).ok()?;
    parsed.set_fragment(None);
    parsed.set_query(None);
    Some(parsed.to_string().trim_end_matches('/').to_string())
}
