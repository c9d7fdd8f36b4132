//! In-process event distribution.
//!
//! The [`EventBus`] is generic over its payload; the download scheduler
//! publishes [`DownloadEvent`](crate::download::DownloadEvent)s keyed by
//! ticket id, and transports subscribe per ticket.

mod bus;

pub use bus::{BusError, Callback, EventBus, Unsubscribe};
