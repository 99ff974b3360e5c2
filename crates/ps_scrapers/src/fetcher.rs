use async_trait::async_trait;
use ps_core::{Error, HarvestConfig, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Retrieves the raw HTML of one page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Single attempt: a non-2xx status is an error, nothing is retried.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// reqwest-backed fetcher that identifies itself with a fixed user agent.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    pub fn from_config(config: &HarvestConfig) -> Result<Self> {
        Self::new(&config.user_agent, config.request_timeout())
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.text().await?;
        debug!(%url, bytes = body.len(), "Fetched page");
        Ok(body)
    }
}
