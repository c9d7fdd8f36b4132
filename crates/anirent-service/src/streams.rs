//! Streams handed to adapters: search results and ticket events.

use std::pin::Pin;
use std::sync::{Mutex, PoisonError};
use std::task::{Context, Poll};

use anirent_core::{DownloadEvent, SearchError, StructuredResult, TicketId, Unsubscribe};
use futures_util::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::{ReceiverStream, UnboundedReceiverStream};
use tokio_util::sync::DropGuard;

/// Results of one search, in arrival order.
///
/// Yields `Ok` items as they are parsed, then at most one `Err` if the
/// search failed. Dropping the stream cancels the search.
#[derive(Debug)]
pub struct SearchStream {
    inner: ReceiverStream<Result<StructuredResult, SearchError>>,
    _cancel: DropGuard,
}

impl SearchStream {
    pub(crate) fn new(
        rx: mpsc::Receiver<Result<StructuredResult, SearchError>>,
        cancel: DropGuard,
    ) -> Self {
        Self {
            inner: ReceiverStream::new(rx),
            _cancel: cancel,
        }
    }
}

impl Stream for SearchStream {
    type Item = Result<StructuredResult, SearchError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

/// Events of one ticket, from the moment of subscription.
///
/// Ends after the terminal event (Completed or Failure), when the ticket's
/// bus stream closes, or when [`EventSubscription::unsubscribe`] is called.
/// Dropping the subscription unsubscribes.
#[derive(Debug)]
pub struct EventSubscription {
    ticket_id: TicketId,
    inner: UnboundedReceiverStream<DownloadEvent>,
    guard: Option<Unsubscribe<DownloadEvent>>,
}

impl EventSubscription {
    pub(crate) fn new(
        ticket_id: TicketId,
        rx: mpsc::UnboundedReceiver<DownloadEvent>,
        guard: Unsubscribe<DownloadEvent>,
    ) -> Self {
        Self {
            ticket_id,
            inner: UnboundedReceiverStream::new(rx),
            guard: Some(guard),
        }
    }

    /// A subscription to a finished ticket: yields `terminal`, then ends.
    pub(crate) fn finished(ticket_id: TicketId, terminal: DownloadEvent) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(terminal);
        Self {
            ticket_id,
            inner: UnboundedReceiverStream::new(rx),
            guard: None,
        }
    }

    /// Ticket this subscription follows.
    pub const fn ticket_id(&self) -> &TicketId {
        &self.ticket_id
    }

    /// Stop receiving new events. Already buffered events are still yielded.
    pub fn unsubscribe(&self) {
        if let Some(guard) = &self.guard {
            guard.unsubscribe();
        }
    }
}

impl Stream for EventSubscription {
    type Item = DownloadEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

/// Bus callback forwarding into one subscription's channel.
///
/// The sender is dropped after a terminal event or a failed delivery, which
/// ends the subscription without touching other subscribers of the ticket.
pub(crate) fn forward_into(
    tx: mpsc::UnboundedSender<DownloadEvent>,
) -> impl Fn(&DownloadEvent) + Send + Sync + 'static {
    let slot = Mutex::new(Some(tx));
    move |event: &DownloadEvent| {
        let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(tx) = slot.as_ref() else {
            return;
        };
        if tx.send(event.clone()).is_err() {
            tracing::debug!(
                target: "anirent.bus",
                ticket = %event.ticket_id,
                "subscriber went away; ending delivery"
            );
            *slot = None;
            return;
        }
        if event.is_terminal() {
            *slot = None;
        }
    }
}
