//! `AnirentService` - the facade every adapter talks to.
//!
//! Both the Axum routes and the CLI delegate to this type. It owns the
//! process-wide shutdown signal, the event bus, the search orchestrator and
//! the download scheduler.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anirent_core::{
    DownloadEvent, EventBus, SearchError, SearchOrchestrator, SearchQuery, ServiceConfig,
    StructuredResult, Ticket, TicketId,
};
use anirent_download::{DownloadScheduler, SchedulerConfig};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::deps::ServiceDeps;
use crate::error::ServiceError;
use crate::streams::{EventSubscription, SearchStream, forward_into};

/// Buffer between a running search and its consumer.
const SEARCH_STREAM_DEPTH: usize = 16;

/// Unified service facade.
///
/// # Construction
///
/// ```ignore
/// let deps = ServiceDeps::from_config(&config)?;
/// let service = AnirentService::new(deps, &config);
/// ```
///
/// Must be constructed inside a tokio runtime: the download dispatcher is
/// spawned immediately.
pub struct AnirentService {
    orchestrator: Arc<SearchOrchestrator>,
    scheduler: Arc<DownloadScheduler>,
    bus: Arc<EventBus<DownloadEvent>>,
    shutdown: CancellationToken,
    shutdown_fired: AtomicBool,
}

impl AnirentService {
    /// Create the service and start its download dispatcher.
    pub fn new(deps: ServiceDeps, config: &ServiceConfig) -> Self {
        let shutdown = CancellationToken::new();
        let bus = Arc::new(EventBus::new());

        let orchestrator = Arc::new(
            SearchOrchestrator::new(deps.provider, deps.parser)
                .with_deadline(config.search_deadline),
        );
        let scheduler = DownloadScheduler::start(
            deps.engine,
            Arc::clone(&bus),
            SchedulerConfig::from_service(config),
            shutdown.clone(),
        );

        Self {
            orchestrator,
            scheduler,
            bus,
            shutdown,
            shutdown_fired: AtomicBool::new(false),
        }
    }

    // =========================================================================
    // Boundary operations
    // =========================================================================

    /// Start a search and stream its results.
    ///
    /// Parsed results arrive as they are found; a failure is yielded last.
    /// Dropping the returned stream cancels every in-flight provider call.
    pub fn search(&self, query: SearchQuery) -> SearchStream {
        let (out_tx, out_rx) = mpsc::channel(SEARCH_STREAM_DEPTH);
        let cancel = CancellationToken::new();
        let guard = cancel.clone().drop_guard();
        let orchestrator = Arc::clone(&self.orchestrator);

        tokio::spawn(async move {
            let (sink_tx, mut sink_rx) = mpsc::channel::<StructuredResult>(1);

            let forward = async {
                while let Some(result) = sink_rx.recv().await {
                    if out_tx.send(Ok(result)).await.is_err() {
                        // Consumer is gone; closing the sink cancels the search.
                        sink_rx.close();
                        break;
                    }
                }
            };
            let (outcome, ()) = tokio::join!(orchestrator.search(&query, sink_tx, cancel), forward);

            match outcome {
                Ok(()) | Err(SearchError::Cancelled) => {}
                Err(err) => {
                    let _ = out_tx.send(Err(err)).await;
                }
            }
        });

        SearchStream::new(out_rx, guard)
    }

    /// Admit `target` for download.
    ///
    /// Waits for the single admission slot; fails with
    /// [`ServiceError::Cancelled`] if `cancel` fires first and with
    /// [`ServiceError::Unavailable`] once shutdown began.
    pub async fn download(
        &self,
        target: StructuredResult,
        cancel: &CancellationToken,
    ) -> Result<Ticket, ServiceError> {
        Ok(self.scheduler.submit(target, cancel).await?)
    }

    /// Follow the lifecycle events of `ticket_id`.
    ///
    /// A ticket that already finished yields its terminal event and ends.
    /// Fails with [`ServiceError::NotFound`] for unknown tickets and for
    /// tickets aborted by shutdown.
    pub fn subscribe(&self, ticket_id: &TicketId) -> Result<EventSubscription, ServiceError> {
        let (tx, rx) = mpsc::unbounded_channel();
        // Subscribe before reading the outcome: the terminal event is recorded
        // ahead of its publication, so one of the two always sees it.
        let live = self.bus.subscribe(ticket_id.as_str(), forward_into(tx));
        if let Some(terminal) = self.scheduler.outcome(ticket_id) {
            drop(live);
            tracing::debug!(target: "anirent.bus", ticket = %ticket_id, "replaying terminal event");
            return Ok(EventSubscription::finished(ticket_id.clone(), terminal));
        }
        let guard = live?;
        tracing::debug!(target: "anirent.bus", ticket = %ticket_id, "subscribed");
        Ok(EventSubscription::new(ticket_id.clone(), rx, guard))
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Number of admitted, unfinished tickets.
    pub fn active_downloads(&self) -> usize {
        self.scheduler.active_count()
    }

    // =========================================================================
    // Shutdown
    // =========================================================================

    /// Fire the process-wide shutdown signal. Only the first call has an effect.
    pub fn shutdown(&self) {
        if self.shutdown_fired.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::info!(
            target: "anirent.download",
            active = self.scheduler.active_count(),
            "Shutdown requested"
        );
        self.shutdown.cancel();
    }

    /// Whether [`shutdown`](Self::shutdown) has been called.
    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Resolves once shutdown has been requested.
    pub async fn shutdown_requested(&self) {
        self.shutdown.cancelled().await;
    }

    /// Wait for download workers to stop, then close every event stream.
    ///
    /// Call after [`shutdown`](Self::shutdown); open subscriptions end.
    pub async fn drain(&self) {
        self.scheduler.wait_idle().await;
        self.bus.close_all();
        tracing::info!(target: "anirent.download", "Service drained");
    }
}

impl std::fmt::Debug for AnirentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnirentService")
            .field("active_downloads", &self.scheduler.active_count())
            .field("streams", &self.bus.stream_count())
            .field("shutting_down", &self.shutdown.is_cancelled())
            .finish_non_exhaustive()
    }
}
