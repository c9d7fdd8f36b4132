//! Error types for the BTDigg provider.

use anirent_core::SearchError;
use thiserror::Error;

/// Errors raised while scraping BTDigg.
#[derive(Debug, Error)]
pub enum BtDiggError {
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    /// The request never produced a response.
    #[error("request to {url} failed: {message}")]
    Request {
        /// Requested URL.
        url: String,
        /// Transport error message.
        message: String,
    },

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// A CSS selector failed to compile.
    #[error("invalid selector {0}")]
    Selector(String),

    /// The configured base URL cannot be used to build search URLs.
    #[error("invalid base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Result type alias for BTDigg operations.
pub type BtDiggResult<T> = Result<T, BtDiggError>;

impl From<BtDiggError> for SearchError {
    fn from(err: BtDiggError) -> Self {
        Self::provider(err.to_string())
    }
}
