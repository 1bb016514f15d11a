pub mod client;
pub mod config;
pub mod crawl;
pub mod discover;
pub mod error;
pub mod extract;
pub mod sitemap;

pub use client::build_client;
pub use config::SiteConfig;
pub use crawl::Crawler;
pub use discover::{HybridOutcome, discover_via_hybrid};
pub use error::ScrapeError;
pub use extract::Extractor;
pub use sitemap::discover_via_sitemap;
