//! BTDigg provider configuration.

use std::time::Duration;

use anirent_core::{DEFAULT_BTDIGG_MAX_PAGES, DEFAULT_USER_AGENT, ServiceConfig};

/// Public BTDigg endpoint.
pub const DEFAULT_BASE_URL: &str = "https://btdig.com";

/// Per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for [`BtDiggProvider`](crate::BtDiggProvider).
#[derive(Debug, Clone)]
pub struct BtDiggConfig {
    /// Site root; search and pagination URLs are resolved against it.
    pub base_url: String,
    /// User-Agent header for every request.
    pub user_agent: String,
    /// Upper bound on result pages fetched per query.
    pub max_pages: usize,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for BtDiggConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_pages: DEFAULT_BTDIGG_MAX_PAGES,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl BtDiggConfig {
    /// Derive provider settings from the service configuration.
    #[must_use]
    pub fn from_service(config: &ServiceConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_pages: config.btdigg_max_pages,
            ..Self::default()
        }
    }

    /// Point the provider at another host (used by tests and mirrors).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the page bound.
    #[must_use]
    pub const fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }
}
