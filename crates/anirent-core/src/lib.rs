//! Core of anirent: domain types, the keyed event bus, the search
//! orchestrator and the ports that adapters implement.
//!
//! This crate performs no network or filesystem I/O of its own. Adapters
//! (`anirent-parser`, `anirent-btdigg`, `anirent-download`) implement the
//! ports; `anirent-service` wires everything together.

#![deny(unused_crate_dependencies)]

// Dev-dependencies used only by integration tests.
#[cfg(test)]
use tokio_test as _;

pub mod domain;
pub mod download;
pub mod events;
pub mod ports;
pub mod search;
pub mod settings;
pub mod utils;

// Re-export commonly used types for convenience
pub use domain::{
    ContainerFormat, Episode, RawResult, ReleaseDetails, Resolution, SearchQuery,
    StructuredResult, UnknownResolution,
};
pub use download::{
    DownloadError, DownloadEvent, EngineError, EventPayload, Ticket, TicketId, TicketState,
};
pub use events::{BusError, EventBus, Unsubscribe};
pub use ports::{
    ContentInfo, DownloadEngine, EngineHandle, NameParser, ParseError, SearchProvider,
};
pub use search::{DEFAULT_SEARCH_DEADLINE, SearchError, SearchOrchestrator};
pub use settings::{
    ConfigError, DEFAULT_BTDIGG_MAX_PAGES, DEFAULT_LISTEN_ADDR, DEFAULT_POLL_INTERVAL,
    DEFAULT_USER_AGENT, ServiceConfig,
};
pub use utils::plex_file_name;
