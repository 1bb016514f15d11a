use crate::error::{Result, ScrapeError};
use url::Url;

/// Site-specific knobs for discovery and extraction.
///
/// The defaults describe a bilingual corporate site with Danish and English
/// article sections. Every knob has a `with_` builder so a different site
/// layout can be described without touching the pipeline.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    base_url: Url,
    /// Path substrings that mark a URL as an article page.
    article_markers: Vec<String>,
    /// Path substrings that disqualify a URL even when a marker matches.
    exclusions: Vec<String>,
    /// Path substrings worth following during a crawl even though the page
    /// itself is not an article (section fronts, paginated listings).
    listing_markers: Vec<String>,
    /// Paths relative to the base URL that seed a crawl.
    entry_paths: Vec<String>,
    max_pages: usize,
    request_delay_ms: u64,
    timeout_secs: u64,
    /// Extraction fetches get a longer timeout than discovery: article
    /// pages are heavier than listings and sitemaps.
    extract_timeout_secs: u64,
}

impl SiteConfig {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ScrapeError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.host_str().is_none() {
            return Err(ScrapeError::InvalidUrl(format!(
                "URL has no host: {}",
                base_url
            )));
        }

        Ok(Self {
            base_url,
            article_markers: vec!["/artikler/".to_string(), "/articles/".to_string()],
            exclusions: vec![
                "/page/".to_string(),
                "/artikler/artikler".to_string(),
                "/articles/articles".to_string(),
            ],
            listing_markers: vec![
                "/artikler".to_string(),
                "/articles".to_string(),
                "/blog".to_string(),
                "/inspiration".to_string(),
            ],
            entry_paths: vec![
                "artikler/".to_string(),
                "articles/".to_string(),
                "da/artikler/".to_string(),
                "en/articles/".to_string(),
            ],
            max_pages: 100,
            request_delay_ms: 500,
            timeout_secs: 10,
            extract_timeout_secs: 15,
        })
    }

    pub fn with_article_markers(mut self, markers: Vec<String>) -> Self {
        self.article_markers = markers;
        self
    }

    pub fn with_exclusions(mut self, exclusions: Vec<String>) -> Self {
        self.exclusions = exclusions;
        self
    }

    pub fn with_listing_markers(mut self, markers: Vec<String>) -> Self {
        self.listing_markers = markers;
        self
    }

    pub fn with_entry_paths(mut self, paths: Vec<String>) -> Self {
        self.entry_paths = paths;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_request_delay_ms(mut self, delay_ms: u64) -> Self {
        self.request_delay_ms = delay_ms;
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_extract_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.extract_timeout_secs = timeout_secs;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn host(&self) -> &str {
        // Checked at construction.
        self.base_url.host_str().unwrap_or_default()
    }

    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    pub fn request_delay_ms(&self) -> u64 {
        self.request_delay_ms
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    pub fn extract_timeout_secs(&self) -> u64 {
        self.extract_timeout_secs
    }

    /// Absolute seed URLs for a crawl: the base URL plus each entry path
    /// that resolves against it.
    pub fn entry_points(&self) -> Vec<String> {
        let mut seeds = vec![self.base_url.to_string()];
        for path in &self.entry_paths {
            if let Ok(joined) = self.base_url.join(path) {
                seeds.push(joined.to_string());
            }
        }
        seeds
    }

    /// Whether a URL belongs to the configured site, subdomains included.
    pub fn is_same_site(&self, url: &str) -> bool {
        if let Ok(parsed) = Url::parse(url)
            && let Some(host) = parsed.host_str()
        {
            return host == self.host() || host.ends_with(&format!(".{}", self.host()));
        }
        false
    }

    /// An article URL carries a marker, carries no exclusion, and lives on
    /// the configured site.
    pub fn is_article_url(&self, url: &str) -> bool {
        if !self.is_same_site(url) {
            return false;
        }
        let lower = url.to_ascii_lowercase();
        let marked = self.article_markers.iter().any(|m| lower.contains(m.as_str()));
        marked && !self.is_excluded(&lower)
    }

    fn is_excluded(&self, lower_url: &str) -> bool {
        self.exclusions.iter().any(|e| lower_url.contains(e.as_str()))
    }

    /// Whether a non-article URL is still worth fetching while crawling.
    pub fn is_listing_url(&self, url: &str) -> bool {
        if !self.is_same_site(url) {
            return false;
        }
        let lower = url.to_ascii_lowercase();
        self.listing_markers.iter().any(|m| lower.contains(m.as_str()))
    }
}
