//! HTTP backend abstraction for fetching result pages.
//!
//! The provider talks to a [`PageFetcher`] so pagination and cancellation
//! logic can be tested against canned pages.

use async_trait::async_trait;
use url::Url;

use crate::config::BtDiggConfig;
use crate::error::{BtDiggError, BtDiggResult};

// ============================================================================
// Fetcher Trait
// ============================================================================

/// Fetches one page of HTML.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// GET `url` and return the body as text.
    async fn fetch(&self, url: &Url) -> BtDiggResult<String>;
}

// ============================================================================
// Reqwest Backend
// ============================================================================

/// Production fetcher backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Build a client with the configured User-Agent and timeout.
    pub fn new(config: &BtDiggConfig) -> BtDiggResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| BtDiggError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for ReqwestFetcher {
    async fn fetch(&self, url: &Url) -> BtDiggResult<String> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| BtDiggError::Request {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(BtDiggError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response.text().await.map_err(|e| BtDiggError::Request {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}
