//! Page fetching.
//!
//! Scrapers only see the [`Fetch`] trait, so tests can hand them fixture HTML
//! while `main` wires in [`HttpFetcher`]. Fetching is one plain GET per page:
//! no retries, no caching.

use crate::config::HttpConfig;
use crate::error::Result;
use reqwest::Client;
use tracing::{debug, info, instrument};

/// Something that turns a URL into the HTML body at that URL.
pub trait Fetch {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// [`Fetch`] over HTTP(S) with `reqwest`.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()?;
        debug!(
            user_agent = %config.user_agent,
            timeout_secs = config.timeout_secs,
            "Built HTTP client"
        );
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    /// GET `url`; any non-2xx status is an error.
    #[instrument(level = "info", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;
        info!(bytes = body.len(), "Fetched page");
        Ok(body)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::StaticFetcher;
    use super::*;

    #[test]
    fn test_http_fetcher_builds_from_default_config() {
        assert!(HttpFetcher::new(&HttpConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_static_fetcher_serves_fixtures() {
        let fetcher = StaticFetcher::default().with_page("https://example.gov/a", "<p>a</p>");
        assert_eq!(fetcher.fetch("https://example.gov/a").await.unwrap(), "<p>a</p>");
        assert!(fetcher.fetch("https://example.gov/b").await.is_err());
        assert_eq!(fetcher.requested.borrow().len(), 2);
    }
}
