//! HTTP request handlers for the Axum web server.
//!
//! Handlers are thin wrappers that delegate to `AnirentService`.

pub mod downloads;
pub mod search;
pub mod subscriptions;
