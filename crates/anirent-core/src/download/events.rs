//! Download events - discriminated union for ticket lifecycle notifications.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::TicketId;

/// A lifecycle notification for one ticket.
///
/// Every event carries its own unique id and the id of the ticket it
/// belongs to. Published on the event bus under the ticket id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadEvent {
    /// Unique event id.
    pub id: String,
    /// Owning ticket.
    pub ticket_id: TicketId,
    /// What happened.
    pub payload: EventPayload,
}

/// Event payloads.
///
/// The frontend handles this as a discriminated union:
///
/// ```typescript
/// type EventPayload =
///   | { type: "started"; source: string; total_bytes: number; location: string }
///   | { type: "progress"; source: string; downloaded_bytes: number; total_bytes: number; location: string }
///   | { type: "completed"; source: string; total_bytes: number; location: string }
///   | { type: "failure"; message: string };
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    /// Metadata is known and the transfer is about to begin.
    Started {
        /// Locator link the ticket was bound to.
        source: String,
        /// Total content size in bytes.
        total_bytes: u64,
        /// Where the content lands locally.
        location: String,
    },

    /// The cumulative byte count changed.
    Progress {
        /// Locator link the ticket was bound to.
        source: String,
        /// Bytes fetched so far.
        downloaded_bytes: u64,
        /// Total content size in bytes.
        total_bytes: u64,
        /// Where the content lands locally.
        location: String,
    },

    /// All bytes fetched.
    Completed {
        /// Locator link the ticket was bound to.
        source: String,
        /// Total content size in bytes.
        total_bytes: u64,
        /// Where the content lands locally.
        location: String,
    },

    /// The download failed; no further events follow.
    Failure {
        /// Human-readable reason.
        message: String,
    },
}

impl DownloadEvent {
    fn new(ticket_id: &TicketId, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            ticket_id: ticket_id.clone(),
            payload,
        }
    }

    /// Create a `Started` event.
    pub fn started(
        ticket_id: &TicketId,
        source: impl Into<String>,
        total_bytes: u64,
        location: impl Into<String>,
    ) -> Self {
        Self::new(
            ticket_id,
            EventPayload::Started {
                source: source.into(),
                total_bytes,
                location: location.into(),
            },
        )
    }

    /// Create a `Progress` event.
    pub fn progress(
        ticket_id: &TicketId,
        source: impl Into<String>,
        downloaded_bytes: u64,
        total_bytes: u64,
        location: impl Into<String>,
    ) -> Self {
        Self::new(
            ticket_id,
            EventPayload::Progress {
                source: source.into(),
                downloaded_bytes,
                total_bytes,
                location: location.into(),
            },
        )
    }

    /// Create a `Completed` event.
    pub fn completed(
        ticket_id: &TicketId,
        source: impl Into<String>,
        total_bytes: u64,
        location: impl Into<String>,
    ) -> Self {
        Self::new(
            ticket_id,
            EventPayload::Completed {
                source: source.into(),
                total_bytes,
                location: location.into(),
            },
        )
    }

    /// Create a `Failure` event.
    pub fn failure(ticket_id: &TicketId, message: impl Into<String>) -> Self {
        Self::new(
            ticket_id,
            EventPayload::Failure {
                message: message.into(),
            },
        )
    }

    /// Completed and Failure end a subscription.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self.payload,
            EventPayload::Completed { .. } | EventPayload::Failure { .. }
        )
    }

    /// Short name of the payload variant, for logs and SSE event names.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self.payload {
            EventPayload::Started { .. } => "started",
            EventPayload::Progress { .. } => "progress",
            EventPayload::Completed { .. } => "completed",
            EventPayload::Failure { .. } => "failure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_ids_are_unique_per_event() {
        let ticket = TicketId::generate();
        let a = DownloadEvent::progress(&ticket, "src", 1, 10, "/tmp/x");
        let b = DownloadEvent::progress(&ticket, "src", 1, 10, "/tmp/x");
        assert_ne!(a.id, b.id);
        assert_eq!(a.ticket_id, b.ticket_id);
    }

    #[test]
    fn only_completed_and_failure_are_terminal() {
        let ticket = TicketId::generate();
        assert!(!DownloadEvent::started(&ticket, "s", 1, "l").is_terminal());
        assert!(!DownloadEvent::progress(&ticket, "s", 0, 1, "l").is_terminal());
        assert!(DownloadEvent::completed(&ticket, "s", 1, "l").is_terminal());
        assert!(DownloadEvent::failure(&ticket, "boom").is_terminal());
    }

    #[test]
    fn payload_is_tagged_by_type() {
        let ticket: TicketId = "t-1".parse().unwrap();
        let event = DownloadEvent::failure(&ticket, "bind failed");
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["ticket_id"], "t-1");
        assert_eq!(json["payload"]["type"], "failure");
        assert_eq!(json["payload"]["message"], "bind failed");
        assert_eq!(event.kind(), "failure");
    }
}
