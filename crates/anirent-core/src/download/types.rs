//! Core domain types for downloads.
//!
//! Pure data types with no I/O dependencies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::StructuredResult;

/// Opaque identifier issued when a download is admitted.
///
/// Doubles as the event bus key for the ticket's lifecycle events. Ids are
/// minted by the scheduler from a random source; callers never supply them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(String);

impl TicketId {
    /// Mint a fresh random ticket id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow the id as a bus key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TicketId {
    type Err = std::convert::Infallible;

    // Lookups by id are answered by the bus; an unknown id is a NotFound there,
    // not a parse failure here.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

/// An admitted download.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Scheduler-generated id.
    pub id: TicketId,
    /// What to download.
    pub target: StructuredResult,
}

/// Lifecycle state of a ticket inside the scheduler.
///
/// ```text
/// Queued -> Bound -> AwaitingMetadata -> Fetching -> Completed
///             |            |                 |
///             v            v                 v
///           Failed      Aborted / Failed   Aborted / Failed
/// ```
///
/// A bind error goes straight from `Queued` to `Failed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketState {
    /// Admitted, waiting for the dispatcher.
    Queued,
    /// Source bound to the engine.
    Bound,
    /// Waiting for the engine to report metadata.
    AwaitingMetadata,
    /// Content transfer in progress.
    Fetching,
    /// All bytes fetched.
    Completed,
    /// Interrupted by shutdown.
    Aborted,
    /// Engine reported an error.
    Failed,
}

impl TicketState {
    /// Whether no further transitions can happen.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Aborted | Self::Failed)
    }

    /// String form used in logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Bound => "bound",
            Self::AwaitingMetadata => "awaiting_metadata",
            Self::Fetching => "fetching",
            Self::Completed => "completed",
            Self::Aborted => "aborted",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TicketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
