//! Axum HTTP/SSE adapter for anirent.
//!
//! # Routes
//!
//! - `GET /health` - liveness check, answers `OK`
//! - `POST /api/search` - `{name, resolutions}` in, SSE `result` / `error` events out
//! - `POST /api/downloads` - `{result}` in, `{subscription_id}` out
//! - `GET /api/subscriptions/{id}/events` - SSE of the ticket's lifecycle events

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Dev-dependencies used only by integration tests.
#[cfg(test)]
use {
    anirent_core as _, anirent_parser as _, async_trait as _, http_body_util as _,
    tokio_test as _, tower as _,
};

pub mod bootstrap;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod sse;
pub mod state;

// Re-export primary types
pub use bootstrap::{AxumContext, CorsConfig, bootstrap, serve, start_server};
pub use error::HttpError;
pub use routes::create_router;
pub use state::AppState;
