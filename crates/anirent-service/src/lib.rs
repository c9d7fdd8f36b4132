//! Shared service facade for anirent adapters.
//!
//! `AnirentService` composes the search orchestrator, the download scheduler
//! and the event bus behind three boundary operations (search, download,
//! subscribe) and owns the process-wide shutdown signal. The Axum transport
//! and the CLI both delegate to it.

#![deny(unused_crate_dependencies)]

// Dev-dependencies used only by integration tests.
#[cfg(test)]
use {async_trait as _, tokio_test as _};

mod deps;
mod error;
mod service;
mod streams;

pub use deps::ServiceDeps;
pub use error::ServiceError;
pub use service::AnirentService;
pub use streams::{EventSubscription, SearchStream};

// Re-export the types adapters need so they do not have to depend on
// `anirent-core` directly for common operations.
pub use anirent_core::{
    DownloadEvent, EventPayload, Resolution, SearchError, SearchQuery, ServiceConfig,
    StructuredResult, Ticket, TicketId,
};
