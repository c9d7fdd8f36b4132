//! Download admission, dispatch and the HTTP download engine.
//!
//! # Structure
//!
//! - `scheduler` - Single-slot admission queue, dispatcher, one worker per ticket
//! - `engine` - `DownloadEngine` adapters (`HttpEngine`)
//!
//! Lifecycle events are published on the shared
//! [`EventBus`](anirent_core::EventBus) keyed by ticket id.

#![deny(unused_crate_dependencies)]

// Dev-dependencies used only by integration tests.
#[cfg(test)]
use {axum as _, mockall as _, tempfile as _, tokio_test as _};

// Re-export core types for convenience
pub use anirent_core::{
    ContentInfo, DownloadEngine, DownloadError, DownloadEvent, EngineError, EngineHandle,
    EventPayload, Ticket, TicketId, TicketState,
};

mod engine;
mod scheduler;

pub use engine::HttpEngine;
pub use scheduler::{DownloadScheduler, SchedulerConfig};
