//! HTTP implementation of [`PageFetcher`].

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::config::FetchConfig;
use crate::contract::{PageFetcher, StoreError};

/// Fetches pages over HTTP with `reqwest`.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| {
                error!(error = ?e, "Failed to build HTTP client");
                e
            })?;
        debug!(
            timeout_secs = config.timeout_secs,
            user_agent = %config.user_agent,
            "Initialised HTTP fetcher"
        );
        Ok(Self { client })
    }

    /// Wraps an already configured client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, StoreError> {
        info!(url = %url, "Fetching page");
        let response = self.client.get(url).send().await.map_err(|e| {
            error!(error = ?e, url = %url, "HTTP request failed");
            e
        })?;

        let status = response.status();
        if !status.is_success() {
            error!(status = %status, url = %url, "Page returned non-success status");
            return Err(format!("HTTP {status} for {url}").into());
        }

        let body = response.text().await?;
        debug!(url = %url, bytes = body.len(), "Fetched page body");
        Ok(body)
    }
}
