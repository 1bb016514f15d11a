//! Page metadata extraction.
//!
//! Extraction never fails a run: a page that cannot be fetched or parsed
//! still yields a record carrying its URL and timestamp, so the dataset
//! keeps track of every discovered page.

use crate::config::SiteConfig;
use crate::error::Result;
use chrono::{DateTime, Utc};
use pagerot_core::model::{Language, PageRecord, parse_day};
use reqwest::Client;
use scraper::{Html, Selector};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Progress reporting: (pages done, pages total, current URL).
pub type ExtractProgress = Arc<dyn Fn(usize, usize, String) + Send + Sync>;

/// Meta selectors tried in order for the publication date.
const PUBLISHED_SELECTORS: [&str; 4] = [
    r#"meta[property="article:published_time"]"#,
    r#"meta[name="date"]"#,
    r#"meta[property="og:published_time"]"#,
    r#"meta[name="publishdate"]"#,
];

/// Meta selectors tried in order for the modification date.
const MODIFIED_SELECTORS: [&str; 3] = [
    r#"meta[property="article:modified_time"]"#,
    r#"meta[property="og:updated_time"]"#,
    r#"meta[name="last-modified"]"#,
];

/// Class name fragments that mark an element as tag-like.
const TAG_CLASS_MARKERS: [&str; 4] = ["tag", "category", "label", "keyword"];

/// Visible tag text longer than this is assumed to be body copy that
/// happens to sit in a tag-classed container.
const MAX_TAG_TEXT_LEN: usize = 50;

pub struct Extractor {
    client: Client,
    request_delay_ms: u64,
}

impl Extractor {
    pub fn new(client: Client, config: &SiteConfig) -> Self {
        Self {
            client,
            request_delay_ms: config.request_delay_ms(),
        }
    }

    /// Extract metadata from every URL in order, spacing requests by the
    /// configured delay. One record per input URL, always.
    pub async fn extract_all(
        &self,
        urls: &[String],
        progress: Option<ExtractProgress>,
    ) -> Vec<PageRecord> {
        let mut records = Vec::with_capacity(urls.len());
        for (i, url) in urls.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(Duration::from_millis(self.request_delay_ms)).await;
            }
            if let Some(ref callback) = progress {
                callback(i + 1, urls.len(), url.clone());
            }
            records.push(self.extract(url).await);
        }
        records
    }

    /// Extract metadata from one page. Infallible: failures degrade to a
    /// bare record with only the URL and timestamp filled in.
    pub async fn extract(&self, url: &str) -> PageRecord {
        let scraped_at = Utc::now();
        match self.fetch(url).await {
            Ok(body) => parse_page(&body, url, scraped_at),
            Err(e) => {
                warn!(url = %url, error = %e, "extraction failed, recording bare entry");
                PageRecord::bare(url, scraped_at)
            }
        }
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Parse one page body into a record.
///
/// Synchronous: the parsed document is not `Send` and must not cross an
/// await point.
fn parse_page(html: &str, url: &str, scraped_at: DateTime<Utc>) -> PageRecord {
    let document = Html::parse_document(html);

    let title = extract_title(&document).unwrap_or_else(|| humanize_slug(url));
    let date_created = first_meta_content(&document, &PUBLISHED_SELECTORS)
        .and_then(|raw| parse_day(&raw));
    let date_modified = first_meta_content(&document, &MODIFIED_SELECTORS)
        .and_then(|raw| parse_day(&raw));
    let tags = extract_tags(&document);

    debug!(url = %url, title = %title, tags = tags.len(), "extracted metadata");

    PageRecord {
        url: url.to_string(),
        language: Language::from_url(url),
        title,
        date_created,
        date_modified,
        tags,
        scraped_at,
    }
}

/// The document title, or the first `<h1>` when the title element is
/// missing or empty.
fn extract_title(document: &Html) -> Option<String> {
    for selector in ["title", "h1"] {
        let selector = Selector::parse(selector).unwrap();
        if let Some(element) = document.select(&selector).next() {
            let text = collapse_whitespace(&element.text().collect::<String>());
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// Content of the first matching meta element with a non-empty `content`
/// attribute, trying the selectors in order.
fn first_meta_content(document: &Html, selectors: &[&str]) -> Option<String> {
    for selector in selectors {
        let selector = Selector::parse(selector).unwrap();
        if let Some(content) = document
            .select(&selector)
            .next()
            .and_then(|e| e.value().attr("content"))
            .map(str::trim)
            .filter(|c| !c.is_empty())
        {
            return Some(content.to_string());
        }
    }
    None
}

/// Collect tags from three sources: the `keywords` meta (comma-separated),
/// `article:tag` metas, and visible elements whose class name suggests a
/// tag widget. Deduplicated and sorted.
fn extract_tags(document: &Html) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();

    let keywords = Selector::parse(r#"meta[name="keywords"]"#).unwrap();
    if let Some(content) = document
        .select(&keywords)
        .next()
        .and_then(|e| e.value().attr("content"))
    {
        tags.extend(
            content
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from),
        );
    }

    let article_tag = Selector::parse(r#"meta[property="article:tag"]"#).unwrap();
    for element in document.select(&article_tag) {
        if let Some(content) = element.value().attr("content") {
            let content = content.trim();
            if !content.is_empty() {
                tags.push(content.to_string());
            }
        }
    }

    let classed = Selector::parse("[class]").unwrap();
    for element in document.select(&classed) {
        let tag_like = element.value().classes().any(|class| {
            let lower = class.to_ascii_lowercase();
            TAG_CLASS_MARKERS.iter().any(|m| lower.contains(m))
        });
        if !tag_like {
            continue;
        }
        let text = collapse_whitespace(&element.text().collect::<String>());
        if !text.is_empty() && text.len() < MAX_TAG_TEXT_LEN {
            tags.push(text);
        }
    }

    tags.sort();
    tags.dedup();
    tags
}

/// Fallback title from the URL: the last path segment with hyphens turned
/// into spaces and each word capitalized.
fn humanize_slug(url: &str) -> String {
    let slug = url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();

    slug.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::build_client;
    use chrono::NaiveDate;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    // ========================================================================
    // Parsing
    // ========================================================================

    #[test]
    fn test_parse_full_page() {
        let html = r#"<html><head>
            <title>Good Leadership  in Practice</title>
            <meta property="article:published_time" content="2024-03-01T08:00:00+00:00">
            <meta property="article:modified_time" content="2025-01-15">
            <meta name="keywords" content="leadership, culture">
            <meta property="article:tag" content="Management">
        </head><body>
            <span class="post-tag">Strategy</span>
        </body></html>"#;

        let record = parse_page(html, "https://x.com/en/articles/good-leadership", now());

        assert_eq!(record.title, "Good Leadership in Practice");
        assert_eq!(record.language, Language::En);
        assert_eq!(record.date_created, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(record.date_modified, NaiveDate::from_ymd_opt(2025, 1, 15));
        assert_eq!(
            record.tags,
            vec![
                "Management".to_string(),
                "Strategy".to_string(),
                "culture".to_string(),
                "leadership".to_string(),
            ]
        );
    }

    #[test]
    fn test_title_falls_back_to_h1() {
        let html = "<html><body><h1>From The Heading</h1></body></html>";
        let record = parse_page(html, "https://x.com/articles/a", now());
        assert_eq!(record.title, "From The Heading");
    }

    #[test]
    fn test_title_falls_back_to_slug() {
        let html = "<html><body><p>no heading here</p></body></html>";
        let record = parse_page(html, "https://x.com/articles/why-leadership-matters", now());
        assert_eq!(record.title, "Why Leadership Matters");
    }

    #[test]
    fn test_date_cascade_order() {
        // publishdate is present but article:published_time wins.
        let html = r#"<html><head>
            <meta name="publishdate" content="2020-01-01">
            <meta property="article:published_time" content="2024-06-01">
        </head></html>"#;
        let record = parse_page(html, "https://x.com/articles/a", now());
        assert_eq!(record.date_created, NaiveDate::from_ymd_opt(2024, 6, 1));
    }

    #[test]
    fn test_unparseable_dates_become_none() {
        let html = r#"<html><head>
            <meta property="article:published_time" content="last tuesday">
            <meta property="article:modified_time" content="">
        </head></html>"#;
        let record = parse_page(html, "https://x.com/articles/a", now());
        assert_eq!(record.date_created, None);
        assert_eq!(record.date_modified, None);
    }

    #[test]
    fn test_long_tag_text_is_ignored() {
        let html = r#"<html><body>
            <div class="tag-cloud">This is a long paragraph of body copy that happens to live in a tag container and should not count</div>
            <span class="category">Culture</span>
        </body></html>"#;
        let record = parse_page(html, "https://x.com/articles/a", now());
        assert_eq!(record.tags, vec!["Culture".to_string()]);
    }

    #[test]
    fn test_tags_are_deduplicated() {
        let html = r#"<html><head>
            <meta name="keywords" content="leadership, leadership">
            <meta property="article:tag" content="leadership">
        </head></html>"#;
        let record = parse_page(html, "https://x.com/articles/a", now());
        assert_eq!(record.tags, vec!["leadership".to_string()]);
    }

    #[test]
    fn test_humanize_slug() {
        assert_eq!(
            humanize_slug("https://x.com/articles/why-leadership-matters"),
            "Why Leadership Matters"
        );
        assert_eq!(humanize_slug("https://x.com/artikler/ledelse/"), "Ledelse");
    }

    // ========================================================================
    // Fetching
    // ========================================================================

    #[tokio::test]
    async fn test_extract_from_live_page() {
        let server = MockServer::start().await;
        let html = r#"<html><head>
            <title>En god artikel</title>
            <meta property="article:published_time" content="2024-05-01">
        </head></html>"#;
        Mock::given(method("GET"))
            .and(path("/artikler/en-god-artikel"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(html, "text/html"))
            .mount(&server)
            .await;

        let config = SiteConfig::new(&server.uri()).unwrap().with_request_delay_ms(0);
        let extractor = Extractor::new(build_client(5).unwrap(), &config);
        let record = extractor
            .extract(&format!("{}/artikler/en-god-artikel", server.uri()))
            .await;

        assert_eq!(record.title, "En god artikel");
        assert_eq!(record.language, Language::Da);
        assert_eq!(record.date_created, NaiveDate::from_ymd_opt(2024, 5, 1));
    }

    #[tokio::test]
    async fn test_failed_fetch_yields_bare_record() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/articles/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let config = SiteConfig::new(&server.uri()).unwrap().with_request_delay_ms(0);
        let extractor = Extractor::new(build_client(5).unwrap(), &config);
        let url = format!("{}/articles/missing", server.uri());
        let record = extractor.extract(&url).await;

        assert_eq!(record.url, url);
        assert!(record.title.is_empty());
        assert_eq!(record.language, Language::Unknown);
        assert_eq!(record.date_created, None);
    }

    #[tokio::test]
    async fn test_extract_all_returns_one_record_per_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/articles/a"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<html><head><title>A</title></head></html>", "text/html"),
            )
            .mount(&server)
            .await;
        // /articles/b is not mounted and 404s.

        let config = SiteConfig::new(&server.uri()).unwrap().with_request_delay_ms(0);
        let extractor = Extractor::new(build_client(5).unwrap(), &config);
        let urls = vec![
            format!("{}/articles/a", server.uri()),
            format!("{}/articles/b", server.uri()),
        ];
        let records = extractor.extract_all(&urls, None).await;

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "A");
        assert!(records[1].title.is_empty());
    }
}
