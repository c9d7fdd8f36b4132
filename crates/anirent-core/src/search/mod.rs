//! Concurrent multi-resolution search.
//!
//! # Structure
//!
//! - `orchestrator` - Fan-out over resolutions, merge, parse, forward
//! - `errors` - Terminal search outcomes

mod errors;
mod orchestrator;

pub use errors::SearchError;
pub use orchestrator::{DEFAULT_SEARCH_DEADLINE, SearchOrchestrator};
