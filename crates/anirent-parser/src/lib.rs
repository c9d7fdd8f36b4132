//! `SubsPlease` release name parsing.
//!
//! Implements the [`NameParser`](anirent_core::NameParser) port on top of a
//! small scanner and a recursive-descent parser.

#![deny(unused_crate_dependencies)]

#[cfg(test)]
use tokio_test as _;

mod parser;
mod scanner;

// =============================================================================
// Public API: Parser + Core Re-exports (minimal surface)
// =============================================================================

/// The release name parser implementation.
pub use parser::{MAX_BATCH_EPISODES, SubsPleaseParser};

// Re-export the port and its error from core for convenience
pub use anirent_core::{NameParser, ParseError};
