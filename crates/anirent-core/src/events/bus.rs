//! Keyed FIFO publish/subscribe bus.
//!
//! Each key owns a stream: a dispatch task fed through a single-slot handoff
//! and the set of callbacks currently registered under that key. Delivery
//! per key is serialized in publish order; distinct keys dispatch
//! independently.
//!
//! # Concurrency Model
//!
//! - Key → stream registry guarded by one `RwLock`, held only for map access
//! - Subscriber list guarded by a `Mutex`, snapshotted per event so callbacks
//!   may unsubscribe (themselves or others) while being invoked
//! - `publish` awaits the dispatch task: it resolves once the event has been
//!   handed to every subscriber registered at dispatch time, or the stream closed

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

/// Subscriber callback. Must not block: a blocking callback stalls every
/// subscriber of its key.
pub type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Errors returned by the event bus.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BusError {
    /// No stream exists for the key.
    #[error("bus: no stream with id - {key}")]
    NotFound {
        /// The requested key.
        key: String,
    },
}

struct Envelope<T> {
    event: T,
    delivered: oneshot::Sender<()>,
}

struct Stream<T> {
    key: String,
    handoff: mpsc::Sender<Envelope<T>>,
    closed: CancellationToken,
    next_subscriber: AtomicU64,
    subscribers: Mutex<Vec<(u64, Callback<T>)>>,
}

impl<T> Stream<T> {
    fn remove_subscriber(&self, id: u64) {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(sid, _)| *sid != id);
    }

    fn clear_subscribers(&self) {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl<T: Send + 'static> Stream<T> {
    fn spawn(key: &str) -> Arc<Self> {
        let (handoff, rx) = mpsc::channel(1);
        let stream = Arc::new(Self {
            key: key.to_string(),
            handoff,
            closed: CancellationToken::new(),
            next_subscriber: AtomicU64::new(0),
            subscribers: Mutex::new(Vec::new()),
        });
        tokio::spawn(Self::dispatch(Arc::clone(&stream), rx));
        stream
    }

    async fn dispatch(stream: Arc<Self>, mut rx: mpsc::Receiver<Envelope<T>>) {
        tracing::trace!(target: "anirent.bus", key = %stream.key, "stream dispatch started");
        loop {
            tokio::select! {
                // Drain an accepted event before honouring close.
                biased;

                Some(envelope) = rx.recv() => {
                    stream.deliver(&envelope.event);
                    let _ = envelope.delivered.send(());
                }
                () = stream.closed.cancelled() => break,
            }
        }
        stream.clear_subscribers();
        tracing::trace!(target: "anirent.bus", key = %stream.key, "stream dispatch stopped");
    }

    fn deliver(&self, event: &T) {
        let callbacks: Vec<Callback<T>> = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();

        for callback in callbacks {
            callback(event);
        }
    }

    async fn publish(&self, event: T) {
        let (delivered, ack) = oneshot::channel();
        let envelope = Envelope { event, delivered };

        let accepted = tokio::select! {
            biased;

            () = self.closed.cancelled() => false,
            res = self.handoff.send(envelope) => res.is_ok(),
        };

        if accepted {
            // Err means the stream closed before dispatching; nothing to wait for.
            let _ = ack.await;
        } else {
            tracing::trace!(target: "anirent.bus", key = %self.key, "publish dropped: stream closed");
        }
    }

    fn subscribe(self: &Arc<Self>, callback: Callback<T>) -> Unsubscribe<T> {
        let id = self.next_subscriber.fetch_add(1, Ordering::Relaxed);
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, callback));

        Unsubscribe {
            stream: Arc::downgrade(self),
            id,
        }
    }
}

/// Capability returned by [`EventBus::subscribe`] that removes the callback.
///
/// `unsubscribe` is idempotent and safe to call concurrently with delivery,
/// including from inside the callback itself. Dropping the capability
/// unsubscribes too.
pub struct Unsubscribe<T> {
    stream: Weak<Stream<T>>,
    id: u64,
}

impl<T> Unsubscribe<T> {
    /// Remove the callback from its stream.
    pub fn unsubscribe(&self) {
        if let Some(stream) = self.stream.upgrade() {
            stream.remove_subscriber(self.id);
        }
    }
}

impl<T> Drop for Unsubscribe<T> {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl<T> std::fmt::Debug for Unsubscribe<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Unsubscribe").field("id", &self.id).finish()
    }
}

/// Generic keyed event bus.
///
/// Constructed once per process and shared by reference (`Arc`); there is
/// no global instance. Streams spawn tokio tasks, so stream creation must
/// happen inside a runtime.
pub struct EventBus<T> {
    streams: RwLock<HashMap<String, Arc<Stream<T>>>>,
}

impl<T> Default for EventBus<T> {
    fn default() -> Self {
        Self {
            streams: RwLock::new(HashMap::new()),
        }
    }
}

impl<T> Drop for EventBus<T> {
    fn drop(&mut self) {
        // Dispatch tasks hold their own stream; without this they never end.
        let streams = self.streams.get_mut().unwrap_or_else(PoisonError::into_inner);
        for stream in streams.values() {
            stream.closed.cancel();
        }
    }
}

impl<T> std::fmt::Debug for EventBus<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("streams", &self.stream_count())
            .finish()
    }
}

impl<T> EventBus<T> {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live streams.
    pub fn stream_count(&self) -> usize {
        self.streams
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether a stream exists for `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.streams
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    /// Number of callbacks registered under `key`, if the stream exists.
    pub fn subscriber_count(&self, key: &str) -> Option<usize> {
        let stream = self.get(key)?;
        let count = stream
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        Some(count)
    }

    /// Stop the stream for `key` and drop its subscribers.
    ///
    /// Events already accepted by the dispatch task are still delivered.
    /// A later `publish` to the same key starts a fresh stream.
    pub fn close(&self, key: &str) {
        let removed = self
            .streams
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);

        if let Some(stream) = removed {
            stream.closed.cancel();
            tracing::debug!(target: "anirent.bus", key, "stream closed");
        }
    }

    /// Close every stream. Used on process shutdown.
    pub fn close_all(&self) {
        let drained: Vec<Arc<Stream<T>>> = self
            .streams
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .map(|(_, stream)| stream)
            .collect();

        for stream in &drained {
            stream.closed.cancel();
        }
        tracing::debug!(target: "anirent.bus", count = drained.len(), "all streams closed");
    }

    fn get(&self, key: &str) -> Option<Arc<Stream<T>>> {
        self.streams
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

impl<T: Send + 'static> EventBus<T> {
    /// Ensure a stream exists for `key`; returns `true` if it was created.
    ///
    /// Idempotent with respect to existence: a second call keeps the
    /// existing stream and its subscribers.
    pub fn create_or_get_stream(&self, key: &str) -> bool {
        if self.contains(key) {
            return false;
        }

        let mut streams = self
            .streams
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if streams.contains_key(key) {
            return false;
        }
        streams.insert(key.to_string(), Stream::spawn(key));
        tracing::debug!(target: "anirent.bus", key, "stream created");
        true
    }

    /// Publish `event` under `key`.
    ///
    /// If no stream exists one is created and `event` is the first thing it
    /// delivers. Resolves once the event has been dispatched to the
    /// subscribers registered at that moment, or the stream closed.
    pub async fn publish(&self, key: &str, event: T) {
        let stream = match self.get(key) {
            Some(stream) => stream,
            None => {
                self.create_or_get_stream(key);
                match self.get(key) {
                    Some(stream) => stream,
                    // Closed concurrently between creation and lookup.
                    None => return,
                }
            }
        };
        stream.publish(event).await;
    }

    /// Register `callback` for every event published under `key` from now on.
    ///
    /// Fails with [`BusError::NotFound`] when no stream exists for `key`.
    pub fn subscribe<F>(&self, key: &str, callback: F) -> Result<Unsubscribe<T>, BusError>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let stream = self.get(key).ok_or_else(|| BusError::NotFound {
            key: key.to_string(),
        })?;
        Ok(stream.subscribe(Arc::new(callback)))
    }
}
