//! Download engine port.
//!
//! The engine owns the actual retrieval (HTTP, `BitTorrent`, ...). The
//! scheduler only binds sources, waits for metadata and polls byte counts.

use std::sync::Arc;

use async_trait::async_trait;

use crate::download::EngineError;

/// What the engine knows about a source once metadata is ready.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentInfo {
    /// Total content size in bytes.
    pub total_bytes: u64,
    /// Path of the content relative to the engine's data directory.
    pub display_path: String,
}

/// Port for binding locators to a retrieval engine.
#[async_trait]
pub trait DownloadEngine: Send + Sync {
    /// Bind `locator` and return a handle to its transfer.
    async fn add_source(&self, locator: &str) -> Result<Arc<dyn EngineHandle>, EngineError>;
}

/// One bound source inside the engine.
#[async_trait]
pub trait EngineHandle: Send + Sync {
    /// Resolve once metadata is available.
    ///
    /// May never resolve; callers race it against their shutdown signal.
    async fn metadata(&self) -> Result<ContentInfo, EngineError>;

    /// Stop serving already fetched bytes to peers.
    fn disallow_upload(&self);

    /// Begin fetching every byte of the content.
    fn download_all(&self);

    /// Cumulative bytes fetched so far.
    fn bytes_downloaded(&self) -> Result<u64, EngineError>;

    /// Release engine resources held for this source. Idempotent.
    fn release(&self);
}
