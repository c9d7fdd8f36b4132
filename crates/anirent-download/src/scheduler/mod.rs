//! Download admission and dispatch.
//!
//! # Architecture
//!
//! ```text
//! submit() ──► [admission queue, depth 1] ──► dispatcher ──► worker per ticket
//!                                                              │
//!                                              EventBus ◄──────┘ (Started/Progress/Completed/Failure)
//! ```
//!
//! The queue only serializes admission: the dispatcher hands each ticket
//! to its own worker task immediately, so execution width is unbounded.
//!
//! # Lifecycle
//!
//! The ticket's bus stream is created before the ticket is enqueued, so a
//! subscriber that connects right after `submit` returns never misses
//! `Started`. The worker records the terminal event before publishing it and
//! closes the stream afterwards; late subscribers read the recorded outcome
//! through [`DownloadScheduler::outcome`].

mod worker;

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anirent_core::{
    DEFAULT_POLL_INTERVAL, DownloadEngine, DownloadError, DownloadEvent, EventBus,
    ServiceConfig, StructuredResult, Ticket, TicketId, TicketState,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use self::worker::{WorkerDeps, run_job};

/// Depth of the admission queue.
const ADMISSION_SLOTS: usize = 1;

/// Number of finished tickets whose terminal event is retained.
const FINISHED_RETENTION: usize = 1024;

/// Configuration for the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Directory content locations are reported relative to.
    pub data_dir: PathBuf,
    /// Interval between byte-count polls.
    pub poll_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            data_dir: std::env::temp_dir(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl SchedulerConfig {
    /// Derive scheduler settings from the service configuration.
    #[must_use]
    pub fn from_service(config: &ServiceConfig) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            poll_interval: config.poll_interval,
        }
    }
}

/// States of tickets that have not reached a terminal state.
#[derive(Debug, Default)]
pub(crate) struct ActiveTickets {
    states: Mutex<HashMap<TicketId, TicketState>>,
}

impl ActiveTickets {
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<TicketId, TicketState>> {
        self.states.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn set(&self, id: &TicketId, state: TicketState) {
        self.lock().insert(id.clone(), state);
    }

    fn remove(&self, id: &TicketId) {
        self.lock().remove(id);
    }

    fn get(&self, id: &TicketId) -> Option<TicketState> {
        self.lock().get(id).copied()
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}

#[derive(Debug, Default)]
struct FinishedInner {
    events: HashMap<TicketId, DownloadEvent>,
    order: VecDeque<TicketId>,
}

/// Terminal events of the most recently finished tickets, oldest evicted first.
#[derive(Debug, Default)]
pub(crate) struct FinishedTickets {
    inner: Mutex<FinishedInner>,
}

impl FinishedTickets {
    fn lock(&self) -> std::sync::MutexGuard<'_, FinishedInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn record(&self, event: &DownloadEvent) {
        let mut inner = self.lock();
        if inner
            .events
            .insert(event.ticket_id.clone(), event.clone())
            .is_none()
        {
            inner.order.push_back(event.ticket_id.clone());
        }
        while inner.order.len() > FINISHED_RETENTION {
            if let Some(oldest) = inner.order.pop_front() {
                inner.events.remove(&oldest);
            }
        }
    }

    fn get(&self, id: &TicketId) -> Option<DownloadEvent> {
        self.lock().events.get(id).cloned()
    }
}

/// Admits downloads and runs one worker per admitted ticket.
pub struct DownloadScheduler {
    /// Producer side of the admission queue.
    admission: mpsc::Sender<Ticket>,
    /// Consumer side, taken by the dispatcher when it starts.
    receiver: Mutex<Option<mpsc::Receiver<Ticket>>>,
    /// Dependencies cloned into every worker.
    deps: WorkerDeps,
    /// Tracks worker tasks so shutdown can wait for them.
    workers: TaskTracker,
    /// Dispatcher task, awaited by `wait_idle`.
    dispatcher: Mutex<Option<JoinHandle<()>>>,
    /// Whether the dispatcher has been started.
    runner_started: AtomicBool,
}

impl std::fmt::Debug for DownloadScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadScheduler")
            .field("active", &self.active_count())
            .field("workers", &self.workers.len())
            .finish_non_exhaustive()
    }
}

impl DownloadScheduler {
    /// Create a scheduler without starting its dispatcher.
    ///
    /// Tickets admitted before [`ensure_runner`](Self::ensure_runner) stay
    /// in the admission queue.
    pub fn new(
        engine: Arc<dyn DownloadEngine>,
        bus: Arc<EventBus<DownloadEvent>>,
        config: SchedulerConfig,
        shutdown: CancellationToken,
    ) -> Self {
        let (admission, receiver) = mpsc::channel(ADMISSION_SLOTS);
        Self {
            admission,
            receiver: Mutex::new(Some(receiver)),
            deps: WorkerDeps {
                engine,
                bus,
                active: Arc::new(ActiveTickets::default()),
                finished: Arc::new(FinishedTickets::default()),
                data_dir: config.data_dir,
                poll_interval: config.poll_interval,
                shutdown,
            },
            workers: TaskTracker::new(),
            dispatcher: Mutex::new(None),
            runner_started: AtomicBool::new(false),
        }
    }

    /// Create a scheduler and start its dispatcher.
    pub fn start(
        engine: Arc<dyn DownloadEngine>,
        bus: Arc<EventBus<DownloadEvent>>,
        config: SchedulerConfig,
        shutdown: CancellationToken,
    ) -> Arc<Self> {
        let scheduler = Arc::new(Self::new(engine, bus, config, shutdown));
        scheduler.ensure_runner();
        scheduler
    }

    /// Ensure the dispatcher is started.
    ///
    /// Idempotent: calling it multiple times has no effect after the first
    /// call. The dispatcher runs until the shutdown token fires.
    pub fn ensure_runner(&self) {
        if self
            .runner_started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }

        let Some(receiver) = self
            .receiver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        else {
            return;
        };

        let handle = tokio::spawn(dispatch(
            receiver,
            self.deps.clone(),
            self.workers.clone(),
        ));
        *self
            .dispatcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }

    /// Admit `target` for download.
    ///
    /// Waits for the admission slot. If `cancel` fires first the call fails
    /// with [`DownloadError::AdmissionCancelled`] and nothing is enqueued.
    /// Once the scheduler has shut down every call fails with
    /// [`DownloadError::ShuttingDown`].
    pub async fn submit(
        &self,
        target: StructuredResult,
        cancel: &CancellationToken,
    ) -> Result<Ticket, DownloadError> {
        if self.deps.shutdown.is_cancelled() {
            return Err(DownloadError::ShuttingDown);
        }

        let permit = tokio::select! {
            biased;

            () = cancel.cancelled() => {
                tracing::debug!(target: "anirent.download", "Admission cancelled by caller");
                return Err(DownloadError::AdmissionCancelled);
            }
            () = self.deps.shutdown.cancelled() => return Err(DownloadError::ShuttingDown),
            permit = self.admission.reserve() => permit.map_err(|_| DownloadError::ShuttingDown)?,
        };

        let ticket = Ticket {
            id: TicketId::generate(),
            target,
        };
        self.deps.bus.create_or_get_stream(ticket.id.as_str());
        self.deps.active.set(&ticket.id, TicketState::Queued);
        permit.send(ticket.clone());

        tracing::info!(
            target: "anirent.download",
            ticket = %ticket.id,
            title = %ticket.target.title,
            "Download admitted"
        );
        Ok(ticket)
    }

    /// State of a ticket that has not yet reached a terminal state.
    pub fn state(&self, id: &TicketId) -> Option<TicketState> {
        self.deps.active.get(id)
    }

    /// Terminal event of a finished ticket, if it is still retained.
    ///
    /// Recorded before the event is published, so a subscriber that finds
    /// the ticket's stream gone (or open but already past its terminal
    /// event) can still learn how it ended. Aborted tickets have none.
    pub fn outcome(&self, id: &TicketId) -> Option<DownloadEvent> {
        self.deps.finished.get(id)
    }

    /// Number of admitted tickets that have not reached a terminal state.
    pub fn active_count(&self) -> usize {
        self.deps.active.len()
    }

    /// The shutdown token observed by the dispatcher and every worker.
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.deps.shutdown
    }

    /// Wait for the dispatcher and every worker to finish.
    ///
    /// Only returns after the shutdown token has fired (or, for a scheduler
    /// whose dispatcher never started, once running workers are done).
    pub async fn wait_idle(&self) {
        let dispatcher = self
            .dispatcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = dispatcher {
            if let Err(err) = handle.await {
                tracing::error!(target: "anirent.download", error = %err, "Dispatcher task failed");
            }
        }
        self.workers.close();
        self.workers.wait().await;
    }
}

/// Drain the admission queue, one worker per ticket, until shutdown.
async fn dispatch(mut receiver: mpsc::Receiver<Ticket>, deps: WorkerDeps, workers: TaskTracker) {
    tracing::debug!(target: "anirent.download", "Dispatcher started");

    loop {
        let ticket = tokio::select! {
            biased;

            () = deps.shutdown.cancelled() => break,
            next = receiver.recv() => match next {
                Some(ticket) => ticket,
                None => break,
            },
        };

        let deps = deps.clone();
        workers.spawn(async move {
            let id = ticket.id.clone();
            let state = run_job(ticket, &deps).await;
            deps.active.remove(&id);
            deps.bus.close(id.as_str());
            tracing::debug!(target: "anirent.download", ticket = %id, state = %state, "Worker finished");
        });
    }

    // Admitted but never dispatched: these tickets never start.
    receiver.close();
    let mut dropped = 0usize;
    while let Ok(ticket) = receiver.try_recv() {
        deps.active.remove(&ticket.id);
        deps.bus.close(ticket.id.as_str());
        dropped += 1;
    }
    workers.close();

    tracing::debug!(target: "anirent.download", dropped, "Dispatcher stopped");
}
