//! Search error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Terminal outcome of a failed search.
///
/// Parse failures are not represented here: they drop a single item and
/// the search continues.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum SearchError {
    /// A provider failed; the whole group was cancelled.
    #[error("search provider failed: {message}")]
    Provider {
        /// Provider error message.
        message: String,
    },

    /// The group deadline elapsed before every provider finished.
    #[error("search deadline of {seconds}s exceeded")]
    DeadlineExceeded {
        /// The configured deadline in seconds.
        seconds: u64,
    },

    /// The caller cancelled or disconnected.
    #[error("search cancelled")]
    Cancelled,
}

impl SearchError {
    /// Create a provider error.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }
}
