//! Download error types.
//!
//! These errors are designed to be serializable and not depend on external
//! error types like `std::io::Error` or `reqwest::Error`. Engine failures
//! capture their message as a string.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for download admission.
///
/// Failures of an admitted ticket never surface here: they are reported to
/// subscribers as a `Failure` event.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum DownloadError {
    /// The caller gave up before the admission slot freed.
    #[error("admission cancelled before a queue slot became available")]
    AdmissionCancelled,

    /// The scheduler has shut down and no longer admits tickets.
    #[error("download scheduler is shutting down")]
    ShuttingDown,
}

/// Error type reported by a download engine.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum EngineError {
    /// The engine does not understand this kind of locator.
    #[error("unsupported locator: {locator}")]
    UnsupportedLocator {
        /// The rejected locator.
        locator: String,
    },

    /// The locator could not be bound to the engine.
    #[error("failed to bind {locator}: {message}")]
    Bind {
        /// The locator being bound.
        locator: String,
        /// Detailed error message.
        message: String,
    },

    /// Metadata could not be obtained.
    #[error("metadata unavailable: {message}")]
    Metadata {
        /// Detailed error message.
        message: String,
    },

    /// The transfer failed after it started.
    #[error("transfer failed: {message}")]
    Transfer {
        /// Detailed error message.
        message: String,
    },

    /// I/O error while writing content.
    #[error("I/O error ({kind}): {message}")]
    Io {
        /// The kind of I/O error.
        kind: String,
        /// Detailed error message.
        message: String,
    },
}

impl EngineError {
    /// Create an unsupported locator error.
    pub fn unsupported(locator: impl Into<String>) -> Self {
        Self::UnsupportedLocator {
            locator: locator.into(),
        }
    }

    /// Create a bind error.
    pub fn bind(locator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Bind {
            locator: locator.into(),
            message: message.into(),
        }
    }

    /// Create a metadata error.
    pub fn metadata(message: impl Into<String>) -> Self {
        Self::Metadata {
            message: message.into(),
        }
    }

    /// Create a transfer error.
    pub fn transfer(message: impl Into<String>) -> Self {
        Self::Transfer {
            message: message.into(),
        }
    }

    /// Create an I/O error from a `std::io::Error`.
    #[must_use]
    pub fn from_io_error(err: &std::io::Error) -> Self {
        Self::Io {
            kind: format!("{:?}", err.kind()),
            message: err.to_string(),
        }
    }
}
