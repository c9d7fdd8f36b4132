//! Axum-specific error types and mappings.
//!
//! Maps `ServiceError` to HTTP status codes and JSON bodies of the form
//! `{"error": "...", "status": 404}`.

use anirent_service::ServiceError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Axum-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request (invalid input).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Service unavailable (shutting down, or the caller gave up).
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HttpError {
    /// Status code this error is reported with.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            Self::NotFound(msg)
            | Self::BadRequest(msg)
            | Self::ServiceUnavailable(msg)
            | Self::Internal(msg) => msg,
        };

        let body = ErrorBody {
            error,
            status: status.as_u16(),
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<ServiceError> for HttpError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound { entity, id } => {
                Self::NotFound(format!("{entity} with id {id} not found"))
            }
            ServiceError::Cancelled => Self::ServiceUnavailable("operation cancelled".to_string()),
            ServiceError::Unavailable(msg) => Self::ServiceUnavailable(msg),
            ServiceError::Config(config) => Self::Internal(format!("Config: {config}")),
            ServiceError::Internal(msg) => Self::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let err = HttpError::from(ServiceError::NotFound {
            entity: "subscription",
            id: "abc".to_string(),
        });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Not found: subscription with id abc not found");
    }

    #[test]
    fn shutdown_maps_to_503() {
        let err = HttpError::from(ServiceError::Unavailable("shutting down".to_string()));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
