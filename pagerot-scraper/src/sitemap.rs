//! Sitemap-based URL discovery.
//!
//! Sitemap locations come from the `Sitemap:` directives in robots.txt,
//! falling back to `<base>/sitemap.xml` when robots.txt lists none. Sitemap
//! index files are followed to a bounded depth; a sitemap that fails to
//! fetch or parse is logged and skipped rather than failing the discovery.

use crate::config::SiteConfig;
use crate::crawl::normalize_url;
use crate::error::{Result, ScrapeError};
use quick_xml::Reader;
use quick_xml::events::Event;
use reqwest::Client;
use std::collections::{BTreeSet, HashSet, VecDeque};
use tracing::{debug, info, warn};

/// Deepest index level still processed; roots sit at depth 0. Real sites
/// rarely nest past two levels.
const MAX_SITEMAP_DEPTH: usize = 3;

/// Discover article URLs through the site's sitemaps.
///
/// Returns the article URLs found, normalized, sorted and deduplicated. An
/// empty result is not an error.
pub async fn discover_via_sitemap(client: &Client, config: &SiteConfig) -> Result<Vec<String>> {
    let roots = sitemap_roots(client, config).await?;
    info!(count = roots.len(), "sitemap roots to traverse");

    let mut articles: BTreeSet<String> = BTreeSet::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut worklist: VecDeque<(String, usize)> = VecDeque::new();

    for root in roots {
        if seen.insert(root.clone()) {
            worklist.push_back((root, 0));
        }
    }

    while let Some((sitemap_url, depth)) = worklist.pop_front() {
        if depth > MAX_SITEMAP_DEPTH {
            debug!(url = %sitemap_url, "sitemap depth limit reached, skipping");
            continue;
        }

        debug!(url = %sitemap_url, depth, "fetching sitemap");
        let xml = match fetch_text(client, &sitemap_url).await {
            Ok(xml) => xml,
            Err(e) => {
                warn!(url = %sitemap_url, error = %e, "failed to fetch sitemap, skipping");
                continue;
            }
        };

        let content = match parse_sitemap(&xml) {
            Ok(content) => content,
            Err(e) => {
                warn!(url = %sitemap_url, error = %e, "failed to parse sitemap, skipping");
                continue;
            }
        };

        for child in content.children {
            if seen.insert(child.clone()) {
                worklist.push_back((child, depth + 1));
            }
        }

        for page in content.pages {
            let page = normalize_url(&page).unwrap_or(page);
            if config.is_article_url(&page) {
                articles.insert(page);
            }
        }
    }

    info!(count = articles.len(), "sitemap discovery complete");
    Ok(articles.into_iter().collect())
}

/// The sitemap URLs to start from: robots.txt directives when present,
/// otherwise the conventional `<base>/sitemap.xml`.
async fn sitemap_roots(client: &Client, config: &SiteConfig) -> Result<Vec<String>> {
    let robots_url = config
        .base_url()
        .join("robots.txt")
        .map_err(|e| ScrapeError::InvalidUrl(e.to_string()))?;

    let mut roots = match fetch_text(client, robots_url.as_str()).await {
        Ok(body) => parse_robots_sitemaps(&body),
        Err(e) => {
            debug!(error = %e, "robots.txt not available");
            Vec::new()
        }
    };

    if roots.is_empty() {
        let default = config
            .base_url()
            .join("sitemap.xml")
            .map_err(|e| ScrapeError::InvalidUrl(e.to_string()))?;
        debug!(url = %default, "no sitemap directives, using default location");
        roots.push(default.to_string());
    }

    Ok(roots)
}

/// Extract `Sitemap:` directive values from a robots.txt body. The directive
/// name is case-insensitive per the robots.txt convention.
fn parse_robots_sitemaps(body: &str) -> Vec<String> {
    body.lines()
        .filter_map(|line| {
            let (key, value) = line.split_once(':')?;
            if key.trim().eq_ignore_ascii_case("sitemap") {
                let value = value.trim();
                (!value.is_empty()).then(|| value.to_string())
            } else {
                None
            }
        })
        .collect()
}

async fn fetch_text(client: &Client, url: &str) -> Result<String> {
    let response = client.get(url).send().await?.error_for_status()?;
    Ok(response.text().await?)
}

/// Locations read out of one sitemap document.
#[derive(Debug, Default)]
struct SitemapContent {
    /// Child sitemaps from `<sitemapindex>` entries.
    children: Vec<String>,
    /// Page URLs from `<urlset>` entries.
    pages: Vec<String>,
}

/// Parse one sitemap document. Index entries and page entries can be read
/// with the same pass: `<loc>` inside a `<sitemap>` element is a child
/// sitemap, `<loc>` inside a `<url>` element is a page.
fn parse_sitemap(xml: &str) -> Result<SitemapContent> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut content = SitemapContent::default();
    let mut buf = Vec::new();
    let mut in_sitemap = false;
    let mut in_loc = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"sitemap" => in_sitemap = true,
                b"loc" => in_loc = true,
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"sitemap" => in_sitemap = false,
                b"loc" => in_loc = false,
                _ => {}
            },
            Ok(Event::Text(e)) if in_loc => {
                let loc = e
                    .unescape()
                    .map_err(|e| ScrapeError::Parse(e.to_string()))?
                    .trim()
                    .to_string();
                if !loc.is_empty() {
                    if in_sitemap {
                        content.children.push(loc);
                    } else {
                        content.pages.push(loc);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ScrapeError::Parse(format!("XML parse error: {e}"))),
            _ => {}
        }
        buf.clear();
    }

    Ok(content)
}
