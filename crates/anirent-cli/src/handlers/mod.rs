//! Command handlers. Each delegates to `AnirentService` or the Axum server.

pub mod download;
pub mod search;
pub mod serve;
