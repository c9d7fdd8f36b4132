//! Semantic error types for service operations.
//!
//! These errors are domain-focused, not HTTP-focused. Adapters map
//! `ServiceError` to their own error types (`HttpError`, CLI exit codes).

use anirent_btdigg::BtDiggError;
use anirent_core::{BusError, ConfigError, DownloadError, EngineError};
use thiserror::Error;

/// Semantic errors for service operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// Entity not found (404-ish).
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Type of entity (e.g. "subscription").
        entity: &'static str,
        /// Identifier that was not found.
        id: String,
    },

    /// The caller gave up before the operation was accepted.
    #[error("operation cancelled")]
    Cancelled,

    /// Service is shutting down or otherwise unavailable (503-ish).
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// Invalid configuration at construction time.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Adapter construction failed.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<DownloadError> for ServiceError {
    fn from(err: DownloadError) -> Self {
        match err {
            DownloadError::AdmissionCancelled => Self::Cancelled,
            DownloadError::ShuttingDown => Self::Unavailable(err.to_string()),
        }
    }
}

impl From<BusError> for ServiceError {
    fn from(err: BusError) -> Self {
        match err {
            BusError::NotFound { key } => Self::NotFound {
                entity: "subscription",
                id: key,
            },
        }
    }
}

impl From<BtDiggError> for ServiceError {
    fn from(err: BtDiggError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<EngineError> for ServiceError {
    fn from(err: EngineError) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admission_errors_map_to_semantic_variants() {
        assert_eq!(
            ServiceError::from(DownloadError::AdmissionCancelled),
            ServiceError::Cancelled
        );
        assert!(matches!(
            ServiceError::from(DownloadError::ShuttingDown),
            ServiceError::Unavailable(_)
        ));
    }

    #[test]
    fn unknown_bus_key_is_a_missing_subscription() {
        let err = ServiceError::from(BusError::NotFound {
            key: "abc".to_string(),
        });
        assert_eq!(err.to_string(), "subscription not found: abc");
    }
}
