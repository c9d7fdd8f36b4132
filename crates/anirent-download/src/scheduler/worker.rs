//! Per-ticket download worker.
//!
//! The worker drives one ticket through the engine and publishes its
//! lifecycle on the event bus. It operates on a value-type job and cloned
//! `Arc` dependencies, with no access to the scheduler's admission queue.
//!
//! # Design Principles
//!
//! - Every suspension point races the process-wide shutdown token
//! - Shutdown is silent: no event is published once it has fired
//! - Engine errors become a single `Failure` event; there are no retries

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anirent_core::{
    DownloadEngine, DownloadEvent, EngineHandle, EventBus, Ticket, TicketId, TicketState,
};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

use super::{ActiveTickets, FinishedTickets};

/// Dependencies for the download worker.
///
/// These are cloned Arc references, allowing the worker to operate
/// independently of the scheduler's state.
#[derive(Clone)]
pub(crate) struct WorkerDeps {
    pub engine: Arc<dyn DownloadEngine>,
    pub bus: Arc<EventBus<DownloadEvent>>,
    pub active: Arc<ActiveTickets>,
    pub finished: Arc<FinishedTickets>,
    pub data_dir: PathBuf,
    pub poll_interval: Duration,
    pub shutdown: CancellationToken,
}

impl WorkerDeps {
    async fn publish(&self, event: DownloadEvent) {
        tracing::debug!(
            target: "anirent.download",
            ticket = %event.ticket_id,
            kind = event.kind(),
            "Publishing event"
        );
        if event.is_terminal() {
            self.finished.record(&event);
        }
        let key = event.ticket_id.as_str().to_owned();
        self.bus.publish(&key, event).await;
    }

    async fn fail(&self, id: &TicketId, message: String) -> TicketState {
        tracing::warn!(target: "anirent.download", ticket = %id, error = %message, "Download failed");
        self.publish(DownloadEvent::failure(id, message)).await;
        TicketState::Failed
    }

    fn transition(&self, id: &TicketId, state: TicketState) {
        tracing::trace!(target: "anirent.download", ticket = %id, state = %state, "Ticket state");
        self.active.set(id, state);
    }
}

/// Run one ticket to a terminal state.
///
/// Returns `Completed`, `Failed` or `Aborted`. The caller owns stream
/// teardown and removal from the active set.
pub(crate) async fn run_job(ticket: Ticket, deps: &WorkerDeps) -> TicketState {
    let id = &ticket.id;
    let source = ticket.target.locator.as_str();

    tracing::info!(
        target: "anirent.download",
        ticket = %id,
        title = %ticket.target.title,
        kind = ticket.target.kind(),
        "Starting download"
    );

    // Step 1: bind the locator
    let bound = tokio::select! {
        biased;

        () = deps.shutdown.cancelled() => return aborted(id, "before bind"),
        res = deps.engine.add_source(source) => res,
    };
    let handle = match bound {
        Ok(handle) => handle,
        Err(err) => return deps.fail(id, err.to_string()).await,
    };
    deps.transition(id, TicketState::Bound);

    let state = drive_handle(id, source, handle.as_ref(), deps).await;
    // Idempotent; covers the failure and shutdown paths.
    handle.release();
    state
}

async fn drive_handle(
    id: &TicketId,
    source: &str,
    handle: &dyn EngineHandle,
    deps: &WorkerDeps,
) -> TicketState {
    // Step 2: wait for metadata, interruptible by shutdown
    deps.transition(id, TicketState::AwaitingMetadata);
    let metadata = tokio::select! {
        biased;

        () = deps.shutdown.cancelled() => return aborted(id, "before metadata"),
        res = handle.metadata() => res,
    };
    let info = match metadata {
        Ok(info) => info,
        Err(err) => return deps.fail(id, err.to_string()).await,
    };

    // Step 3: announce
    let total = info.total_bytes;
    let location = deps.data_dir.join(&info.display_path).display().to_string();
    deps.publish(DownloadEvent::started(id, source, total, location.clone()))
        .await;

    // Step 4: fetch everything, serve nothing
    handle.disallow_upload();
    handle.download_all();
    deps.transition(id, TicketState::Fetching);

    // Step 5: poll until done
    let mut ticker = interval_at(Instant::now() + deps.poll_interval, deps.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut reported = 0u64;

    loop {
        tokio::select! {
            biased;

            () = deps.shutdown.cancelled() => return aborted(id, "during transfer"),
            _ = ticker.tick() => {}
        }

        let downloaded = match handle.bytes_downloaded() {
            Ok(n) => n,
            Err(err) => return deps.fail(id, err.to_string()).await,
        };

        if downloaded != reported {
            reported = downloaded;
            deps.publish(DownloadEvent::progress(id, source, downloaded, total, location.clone()))
                .await;
        }

        // Step 6: done
        if downloaded >= total {
            break;
        }
    }

    handle.release();
    tracing::info!(target: "anirent.download", ticket = %id, bytes = total, "Download completed");
    deps.publish(DownloadEvent::completed(id, source, total, location))
        .await;
    TicketState::Completed
}

fn aborted(id: &TicketId, phase: &'static str) -> TicketState {
    tracing::warn!(target: "anirent.download", ticket = %id, phase, "Shutdown interrupted download");
    TicketState::Aborted
}
