//! Service configuration and validation.
//!
//! Pure configuration types with no infrastructure dependencies. Binaries
//! build a [`ServiceConfig`] from CLI flags and environment, then call
//! [`ServiceConfig::validate`] before wiring adapters.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::search::DEFAULT_SEARCH_DEADLINE;

/// Default listen address for the HTTP transport.
pub const DEFAULT_LISTEN_ADDR: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 8080));

/// Default interval between progress polls of a running download.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default User-Agent sent by HTTP adapters.
pub const DEFAULT_USER_AGENT: &str = "anirent";

/// Default bound on result pages fetched per provider query.
pub const DEFAULT_BTDIGG_MAX_PAGES: usize = 5;

/// Process-wide service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Address the HTTP transport binds to.
    pub listen_addr: SocketAddr,
    /// Directory the download engine writes content into.
    pub data_dir: PathBuf,
    /// Group deadline for one search.
    pub search_deadline: Duration,
    /// Interval between progress polls.
    pub poll_interval: Duration,
    /// User-Agent for outbound HTTP.
    pub user_agent: String,
    /// Maximum number of result pages fetched per provider query.
    pub btdigg_max_pages: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR,
            data_dir: std::env::temp_dir().join("anirent"),
            search_deadline: DEFAULT_SEARCH_DEADLINE,
            poll_interval: DEFAULT_POLL_INTERVAL,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            btdigg_max_pages: DEFAULT_BTDIGG_MAX_PAGES,
        }
    }
}

impl ServiceConfig {
    /// Set the listen address.
    #[must_use]
    pub const fn with_listen_addr(mut self, addr: SocketAddr) -> Self {
        self.listen_addr = addr;
        self
    }

    /// Set the data directory.
    #[must_use]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Set the search deadline.
    #[must_use]
    pub const fn with_search_deadline(mut self, deadline: Duration) -> Self {
        self.search_deadline = deadline;
        self
    }

    /// Set the progress poll interval.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the outbound User-Agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the page bound for provider queries.
    #[must_use]
    pub const fn with_btdigg_max_pages(mut self, pages: usize) -> Self {
        self.btdigg_max_pages = pages;
        self
    }

    /// The data directory.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Check every field for values the service cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyDataDir);
        }
        if self.search_deadline.is_zero() {
            return Err(ConfigError::ZeroDuration("search_deadline"));
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroDuration("poll_interval"));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::EmptyUserAgent);
        }
        if self.btdigg_max_pages == 0 {
            return Err(ConfigError::InvalidPageLimit(self.btdigg_max_pages));
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The data directory path is empty.
    #[error("data directory cannot be empty")]
    EmptyDataDir,

    /// A duration that must be positive is zero.
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    /// The User-Agent is blank.
    #[error("user agent cannot be empty")]
    EmptyUserAgent,

    /// The page limit is out of range.
    #[error("page limit must be at least 1, got {0}")]
    InvalidPageLimit(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ServiceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.listen_addr.port(), 8080);
        assert_eq!(config.search_deadline, Duration::from_secs(10));
        assert_eq!(config.poll_interval, Duration::from_secs(1));
    }

    #[test]
    fn builder_overrides_fields() {
        let config = ServiceConfig::default()
            .with_data_dir("/srv/anirent")
            .with_poll_interval(Duration::from_millis(250))
            .with_btdigg_max_pages(2);
        assert_eq!(config.data_dir(), Path::new("/srv/anirent"));
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.btdigg_max_pages, 2);
    }

    #[test]
    fn rejects_zero_durations_and_limits() {
        let config = ServiceConfig::default().with_poll_interval(Duration::ZERO);
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroDuration("poll_interval"))
        );

        let config = ServiceConfig::default().with_btdigg_max_pages(0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidPageLimit(0)));

        let config = ServiceConfig::default().with_data_dir("");
        assert_eq!(config.validate(), Err(ConfigError::EmptyDataDir));

        let config = ServiceConfig::default().with_user_agent("  ");
        assert_eq!(config.validate(), Err(ConfigError::EmptyUserAgent));
    }
}
