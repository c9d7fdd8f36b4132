//! Search provider port.
//!
//! A provider turns one query string into a finite, lazily produced sequence
//! of raw results (for example by scraping a torrent index page by page).

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::RawResult;
use crate::search::SearchError;

/// Port for a remote search backend.
///
/// Implementations push each hit into `results` as soon as it is known and
/// return when the sequence is exhausted. Returning an error ends the
/// sequence and fails the whole search group.
///
/// A closed `results` channel means nobody is listening any more;
/// implementations should stop and return `Ok(())`.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run `query` and stream its hits into `results`.
    async fn search(
        &self,
        query: &str,
        results: mpsc::Sender<RawResult>,
    ) -> Result<(), SearchError>;
}

