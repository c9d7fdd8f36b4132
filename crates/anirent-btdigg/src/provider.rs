//! BTDigg implementation of the `SearchProvider` port.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use anirent_core::{RawResult, SearchError, SearchProvider};
use async_trait::async_trait;
use tokio::sync::mpsc;
use url::Url;

use crate::config::BtDiggConfig;
use crate::error::BtDiggResult;
use crate::http::{PageFetcher, ReqwestFetcher};
use crate::page::parse_page;

/// Scrapes BTDigg search result pages.
///
/// Pages are fetched one after another, breadth-first from the first
/// result page, until no unvisited pagination links remain or
/// `max_pages` pages were fetched.
pub struct BtDiggProvider {
    fetcher: Arc<dyn PageFetcher>,
    config: BtDiggConfig,
}

impl std::fmt::Debug for BtDiggProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BtDiggProvider")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl BtDiggProvider {
    /// Create a provider with the production HTTP client.
    pub fn new(config: BtDiggConfig) -> BtDiggResult<Self> {
        let fetcher = ReqwestFetcher::new(&config)?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    /// Create a provider with a custom fetcher.
    pub fn with_fetcher(config: BtDiggConfig, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher, config }
    }

    /// URL of the first result page for `query`.
    ///
    /// Spaces in the query are encoded as `+`.
    pub fn search_url(&self, query: &str) -> BtDiggResult<Url> {
        let mut url = Url::parse(&self.config.base_url)?.join("/search")?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("p", "0")
            .append_pair("order", "0");
        Ok(url)
    }
}

#[async_trait]
impl SearchProvider for BtDiggProvider {
    async fn search(
        &self,
        query: &str,
        results: mpsc::Sender<RawResult>,
    ) -> Result<(), SearchError> {
        let first = self.search_url(query)?;
        tracing::debug!(target: "anirent.search", url = %first, "btdigg: fetching first page");

        let mut visited: HashSet<String> = HashSet::new();
        let mut pending = VecDeque::from([first]);
        let mut fetched = 0usize;

        while let Some(url) = pending.pop_front() {
            if fetched >= self.config.max_pages || results.is_closed() {
                break;
            }
            if !visited.insert(url.to_string()) {
                continue;
            }

            let html = match self.fetcher.fetch(&url).await {
                Ok(html) => html,
                // Only the first page decides whether the search failed.
                Err(err) if fetched == 0 => return Err(err.into()),
                Err(err) => {
                    tracing::warn!(target: "anirent.search", url = %url, error = %err, "btdigg: skipping page");
                    continue;
                }
            };
            fetched += 1;

            let page = parse_page(&html, &url)?;
            tracing::debug!(
                target: "anirent.search",
                url = %url,
                results = page.results.len(),
                links = page.links.len(),
                "btdigg: parsed page"
            );

            for result in page.results {
                if results.send(result).await.is_err() {
                    return Ok(());
                }
            }

            pending.extend(
                page.links
                    .into_iter()
                    .filter(|link| !visited.contains(link.as_str())),
            );
        }

        Ok(())
    }
}
