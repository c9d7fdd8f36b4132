//! Download domain types, events and errors.
//!
//! This module contains pure data types for the download system. No I/O,
//! networking, or runtime dependencies allowed.
//!
//! # Structure
//!
//! - `types` - Ticket identifiers and lifecycle state (`TicketId`, `Ticket`, `TicketState`)
//! - `events` - Lifecycle events published per ticket (`DownloadEvent`, `EventPayload`)
//! - `errors` - Admission and engine errors

pub mod errors;
pub mod events;
pub mod types;

pub use errors::{DownloadError, EngineError};
pub use events::{DownloadEvent, EventPayload};
pub use types::{Ticket, TicketId, TicketState};
