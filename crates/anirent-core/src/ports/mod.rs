//! Port definitions (trait abstractions) for external collaborators.
//!
//! Ports define the interfaces that the orchestration layer expects from
//! infrastructure. They contain no implementation details and use only
//! domain types.
//!
//! # Design Rules
//!
//! - No `reqwest` or `scraper` types in any signature
//! - Errors are domain enums that carry messages, not foreign error types
//! - Adapters live in their own crates (`anirent-parser`, `anirent-btdigg`,
//!   `anirent-download`)

pub mod download_engine;
pub mod name_parser;
pub mod search_provider;

pub use download_engine::{ContentInfo, DownloadEngine, EngineHandle};
pub use name_parser::{NameParser, ParseError};
pub use search_provider::SearchProvider;
