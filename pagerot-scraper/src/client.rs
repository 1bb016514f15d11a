use crate::error::{Result, ScrapeError};
use reqwest::Client;
use std::time::Duration;

const USER_AGENT: &str = concat!("pagerot/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client for discovery and extraction. One client per run so
/// connection pooling and cookies carry across requests.
pub fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
        .redirect(reqwest::redirect::Policy::limited(5))
        .gzip(true)
        .cookie_store(true)
        .build()
        .map_err(ScrapeError::Http)
}
