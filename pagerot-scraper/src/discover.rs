//! Strategy selection for URL discovery.

use crate::config::SiteConfig;
use crate::crawl::{Crawler, ProgressCallback};
use crate::error::Result;
use crate::sitemap::discover_via_sitemap;
use reqwest::Client;
use std::collections::BTreeSet;
use tracing::info;

/// Result of hybrid discovery.
#[derive(Debug)]
pub struct HybridOutcome {
    pub urls: Vec<String>,
    /// How many URLs only the crawl found. The crawl's marginal
    /// contribution over the sitemap.
    pub crawl_only: usize,
}

/// Union of sitemap and crawl discovery. Both strategies always run; the
/// result is the same set no matter which strategy finds a URL first.
pub async fn discover_via_hybrid(
    client: &Client,
    config: &SiteConfig,
    progress: Option<ProgressCallback>,
) -> Result<HybridOutcome> {
    let sitemap_urls = discover_via_sitemap(client, config).await?;

    let mut crawler = Crawler::new(client.clone(), config.clone());
    if let Some(callback) = progress {
        crawler = crawler.with_progress_callback(callback);
    }
    let crawl_urls = crawler.crawl().await?;

    let sitemap_set: BTreeSet<String> = sitemap_urls.into_iter().collect();
    let crawl_only = crawl_urls
        .iter()
        .filter(|url| !sitemap_set.contains(*url))
        .count();

    let mut union = sitemap_set;
    union.extend(crawl_urls);

    info!(total = union.len(), crawl_only, "hybrid discovery complete");
    Ok(HybridOutcome {
        urls: union.into_iter().collect(),
        crawl_only,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::build_client;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_html(server: &MockServer, route: &str, body: String) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
            .mount(server)
            .await;
    }

    fn fast_config(server: &MockServer) -> SiteConfig {
        SiteConfig::new(&server.uri())
            .unwrap()
            .with_request_delay_ms(0)
    }

    #[tokio::test]
    async fn test_hybrid_unions_sitemap_and_crawl() {
        let server = MockServer::start().await;

        // Sitemap knows about /articles/a only.
        let sitemap = format!(
            r#"<?xml version="1.0"?><urlset><url><loc>{}/articles/a</loc></url></urlset>"#,
            server.uri()
        );
        Mock::given(method("GET"))
            .and(path("/sitemap.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(sitemap))
            .mount(&server)
            .await;

        // The listing page links /articles/a and /articles/b.
        let listing = format!(
            r#"<html><body>
                <a href="{0}/articles/a">A</a>
                <a href="{0}/articles/b">B</a>
            </body></html>"#,
            server.uri()
        );
        mount_html(&server, "/articles", listing).await;

        let config = fast_config(&server);
        let client = build_client(5).unwrap();

        let sitemap_alone = discover_via_sitemap(&client, &config).await.unwrap();
        let crawl_alone = Crawler::new(client.clone(), config.clone())
            .crawl()
            .await
            .unwrap();
        let outcome = discover_via_hybrid(&client, &config, None).await.unwrap();

        // The hybrid set is exactly the union of the standalone results.
        let mut expected: Vec<String> = sitemap_alone;
        expected.extend(crawl_alone);
        expected.sort();
        expected.dedup();
        assert_eq!(outcome.urls, expected);
        assert_eq!(
            outcome.urls,
            vec![
                format!("{}/articles/a", server.uri()),
                format!("{}/articles/b", server.uri()),
            ]
        );
        assert_eq!(outcome.crawl_only, 1);
    }

    #[tokio::test]
    async fn test_hybrid_with_empty_sitemap_reduces_to_crawl() {
        let server = MockServer::start().await;
        // No robots.txt, no sitemap.xml; only a listing page exists.
        let listing = format!(
            r#"<html><body><a href="{}/articles/from-crawl">x</a></body></html>"#,
            server.uri()
        );
        mount_html(&server, "/articles", listing).await;

        let config = fast_config(&server);
        let client = build_client(5).unwrap();
        let outcome = discover_via_hybrid(&client, &config, None).await.unwrap();

        assert_eq!(
            outcome.urls,
            vec![format!("{}/articles/from-crawl", server.uri())]
        );
        assert_eq!(outcome.crawl_only, 1);
    }
}
