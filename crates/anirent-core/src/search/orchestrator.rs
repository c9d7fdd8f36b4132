//! Fan-out/fan-in search across resolutions.
//!
//! One provider task per requested resolution feeds a shared merge queue;
//! the orchestrator parses each merged hit and forwards it to the caller's
//! sink in arrival order. The first provider error aborts the group.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

use super::errors::SearchError;
use crate::domain::{RawResult, SearchQuery, StructuredResult};
use crate::ports::{NameParser, SearchProvider};

/// Default group deadline for one search.
pub const DEFAULT_SEARCH_DEADLINE: Duration = Duration::from_secs(10);

/// Depth of the merge queue shared by all provider tasks.
const MERGE_QUEUE_DEPTH: usize = 16;

/// Runs searches against a provider and parses the hits.
#[derive(Clone)]
pub struct SearchOrchestrator {
    provider: Arc<dyn SearchProvider>,
    parser: Arc<dyn NameParser>,
    deadline: Duration,
}

impl std::fmt::Debug for SearchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchOrchestrator")
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}

impl SearchOrchestrator {
    /// Create an orchestrator with the default deadline.
    pub fn new(provider: Arc<dyn SearchProvider>, parser: Arc<dyn NameParser>) -> Self {
        Self {
            provider,
            parser,
            deadline: DEFAULT_SEARCH_DEADLINE,
        }
    }

    /// Override the group deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// The configured group deadline.
    #[must_use]
    pub const fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Search every resolution of `query` concurrently and forward parsed
    /// results to `sink` as they arrive.
    ///
    /// Returns once every provider sequence is drained (`Ok`), or with the
    /// first provider error, the deadline, or caller cancellation. A closed
    /// `sink` counts as cancellation. In every error case the remaining
    /// provider calls are aborted before this returns.
    pub async fn search(
        &self,
        query: &SearchQuery,
        sink: mpsc::Sender<StructuredResult>,
        cancel: CancellationToken,
    ) -> Result<(), SearchError> {
        tracing::info!(
            target: "anirent.search",
            name = %query.name,
            resolutions = query.resolutions.len(),
            "Starting search"
        );

        let (merged_tx, mut merged_rx) = mpsc::channel::<RawResult>(MERGE_QUEUE_DEPTH);
        let mut tasks = JoinSet::new();

        for &resolution in &query.resolutions {
            let provider = Arc::clone(&self.provider);
            let results = merged_tx.clone();
            let provider_query = query.provider_query(resolution);
            tasks.spawn(async move {
                tracing::debug!(target: "anirent.search", query = %provider_query, "Provider task started");
                provider.search(&provider_query, results).await
            });
        }
        // The merge queue closes once every provider task drops its sender.
        drop(merged_tx);

        let deadline = tokio::time::sleep(self.deadline);
        tokio::pin!(deadline);

        let mut forwarded = 0usize;
        let outcome = loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => break Err(SearchError::Cancelled),
                () = &mut deadline => break Err(self.deadline_error()),
                raw = merged_rx.recv() => {
                    let Some(raw) = raw else {
                        break Ok(());
                    };
                    let Some(result) = self.parse(raw) else {
                        continue;
                    };
                    let sent = tokio::select! {
                        biased;

                        () = cancel.cancelled() => Err(SearchError::Cancelled),
                        () = &mut deadline => Err(self.deadline_error()),
                        res = sink.send(result) => res.map_err(|_| SearchError::Cancelled),
                    };
                    if let Err(err) = sent {
                        break Err(err);
                    }
                    forwarded += 1;
                }
                Some(joined) = tasks.join_next() => {
                    if let Err(err) = task_outcome(joined) {
                        break Err(err);
                    }
                }
            }
        };

        let outcome = match outcome {
            // Every sender is gone; collect whatever the finished tasks reported.
            Ok(()) => drain_tasks(&mut tasks).await,
            Err(err) => {
                tasks.shutdown().await;
                Err(err)
            }
        };

        match &outcome {
            Ok(()) => tracing::info!(
                target: "anirent.search",
                name = %query.name,
                forwarded,
                "Search completed"
            ),
            Err(err) => tracing::warn!(
                target: "anirent.search",
                name = %query.name,
                forwarded,
                error = %err,
                "Search ended with error"
            ),
        }
        outcome
    }

    fn parse(&self, raw: RawResult) -> Option<StructuredResult> {
        match self.parser.parse(&raw.display_name) {
            Ok(parsed) => Some(parsed.with_locator(raw.locator)),
            Err(err) => {
                tracing::warn!(
                    target: "anirent.search",
                    name = %raw.display_name,
                    error = %err,
                    "Dropping unparseable result"
                );
                None
            }
        }
    }

    const fn deadline_error(&self) -> SearchError {
        SearchError::DeadlineExceeded {
            seconds: self.deadline.as_secs(),
        }
    }
}

fn task_outcome(joined: Result<Result<(), SearchError>, JoinError>) -> Result<(), SearchError> {
    match joined {
        Ok(res) => res,
        Err(err) => Err(SearchError::provider(format!("provider task failed: {err}"))),
    }
}

async fn drain_tasks(tasks: &mut JoinSet<Result<(), SearchError>>) -> Result<(), SearchError> {
    while let Some(joined) = tasks.join_next().await {
        if let Err(err) = task_outcome(joined) {
            tasks.shutdown().await;
            return Err(err);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ContainerFormat, Episode, ReleaseDetails, Resolution};
    use crate::ports::ParseError;
    use async_trait::async_trait;
    use mockall::mock;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};

    mock! {
        Parser {}
        impl NameParser for Parser {
            fn parse(&self, raw: &str) -> Result<StructuredResult, ParseError>;
        }
    }

    /// Per-query script: hits to emit, then an optional delayed failure.
    #[derive(Default, Clone)]
    struct Script {
        hits: Vec<&'static str>,
        fail_after: Option<Duration>,
        hang: bool,
    }

    #[derive(Default)]
    struct ScriptedProvider {
        scripts: HashMap<String, Script>,
        dropped: Arc<AtomicBool>,
    }

    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl SearchProvider for ScriptedProvider {
        async fn search(
            &self,
            query: &str,
            results: mpsc::Sender<RawResult>,
        ) -> Result<(), SearchError> {
            let script = self.scripts.get(query).cloned().unwrap_or_default();
            for hit in script.hits {
                if results
                    .send(RawResult::new(hit, format!("magnet:{hit}")))
                    .await
                    .is_err()
                {
                    return Ok(());
                }
            }
            if let Some(delay) = script.fail_after {
                tokio::time::sleep(delay).await;
                return Err(SearchError::provider("index unreachable"));
            }
            if script.hang {
                let _flag = DropFlag(Arc::clone(&self.dropped));
                std::future::pending::<()>().await;
            }
            Ok(())
        }
    }

    fn episode(title: &str) -> StructuredResult {
        StructuredResult {
            title: title.to_string(),
            resolution: Resolution::P1080,
            format: ContainerFormat::Mkv,
            details: ReleaseDetails::Episode(Episode::new(1, 1)),
            locator: String::new(),
        }
    }

    fn echo_parser() -> MockParser {
        let mut parser = MockParser::new();
        parser.expect_parse().returning(|raw| Ok(episode(raw)));
        parser
    }

    fn orchestrator(provider: ScriptedProvider, parser: MockParser) -> SearchOrchestrator {
        SearchOrchestrator::new(Arc::new(provider), Arc::new(parser))
    }

    async fn collect(mut rx: mpsc::Receiver<StructuredResult>) -> Vec<StructuredResult> {
        let mut out = Vec::new();
        while let Some(item) = rx.recv().await {
            out.push(item);
        }
        out
    }

    #[tokio::test]
    async fn merges_all_resolutions_and_closes_cleanly() {
        let mut provider = ScriptedProvider::default();
        provider.scripts.insert(
            "[SubsPlease] Show (1080p)".to_string(),
            Script {
                hits: vec!["a", "b", "c"],
                ..Script::default()
            },
        );
        let search = orchestrator(provider, echo_parser());
        let query = SearchQuery::new("Show", [Resolution::P1080, Resolution::P720]);

        let (tx, rx) = mpsc::channel(8);
        let collector = tokio::spawn(collect(rx));
        let outcome = search.search(&query, tx, CancellationToken::new()).await;

        assert_eq!(outcome, Ok(()));
        let results = collector.await.unwrap();
        let titles: Vec<_> = results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
        assert_eq!(results[0].locator, "magnet:a");
    }

    #[tokio::test(start_paused = true)]
    async fn provider_failure_surfaces_after_forwarded_items() {
        let mut provider = ScriptedProvider::default();
        provider.scripts.insert(
            "[SubsPlease] Show (1080p)".to_string(),
            Script {
                hits: vec!["a", "b", "c"],
                fail_after: Some(Duration::from_millis(500)),
                ..Script::default()
            },
        );
        provider.scripts.insert(
            "[SubsPlease] Show (720p)".to_string(),
            Script {
                hang: true,
                ..Script::default()
            },
        );
        let dropped = Arc::clone(&provider.dropped);
        let search = orchestrator(provider, echo_parser());
        let query = SearchQuery::new("Show", [Resolution::P1080, Resolution::P720]);

        let (tx, rx) = mpsc::channel(8);
        let collector = tokio::spawn(collect(rx));
        let outcome = search.search(&query, tx, CancellationToken::new()).await;

        assert_eq!(outcome, Err(SearchError::provider("index unreachable")));
        assert_eq!(collector.await.unwrap().len(), 3);
        // The hanging 720p provider was aborted with the group.
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn unparseable_items_are_dropped() {
        let mut provider = ScriptedProvider::default();
        provider.scripts.insert(
            "[SubsPlease] Show (1080p)".to_string(),
            Script {
                hits: vec!["good", "garbage", "also good"],
                ..Script::default()
            },
        );
        let mut parser = MockParser::new();
        parser.expect_parse().times(3).returning(|raw| {
            if raw == "garbage" {
                Err(ParseError::InvalidNumber("garbage".to_string()))
            } else {
                Ok(episode(raw))
            }
        });
        let search = orchestrator(provider, parser);
        let query = SearchQuery::new("Show", [Resolution::P1080]);

        let (tx, rx) = mpsc::channel(8);
        let collector = tokio::spawn(collect(rx));
        let outcome = search.search(&query, tx, CancellationToken::new()).await;

        assert_eq!(outcome, Ok(()));
        let titles: Vec<_> = collector
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["good", "also good"]);
    }

    #[tokio::test]
    async fn caller_cancellation_interrupts_providers() {
        let mut provider = ScriptedProvider::default();
        provider.scripts.insert(
            "[SubsPlease] Show (1080p)".to_string(),
            Script {
                hits: vec!["a"],
                hang: true,
                ..Script::default()
            },
        );
        let dropped = Arc::clone(&provider.dropped);
        let search = orchestrator(provider, echo_parser());
        let query = SearchQuery::new("Show", [Resolution::P1080]);

        let cancel = CancellationToken::new();
        let (tx, mut rx) = mpsc::channel(8);
        let handle = {
            let cancel = cancel.clone();
            tokio::spawn(async move { search.search(&query, tx, cancel).await })
        };

        assert_eq!(rx.recv().await.unwrap().title, "a");
        cancel.cancel();

        assert_eq!(handle.await.unwrap(), Err(SearchError::Cancelled));
        assert!(dropped.load(Ordering::SeqCst));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn closed_sink_counts_as_cancellation() {
        let mut provider = ScriptedProvider::default();
        provider.scripts.insert(
            "[SubsPlease] Show (1080p)".to_string(),
            Script {
                hits: vec!["a", "b"],
                ..Script::default()
            },
        );
        let search = orchestrator(provider, echo_parser());
        let query = SearchQuery::new("Show", [Resolution::P1080]);

        let (tx, rx) = mpsc::channel(8);
        drop(rx);
        let outcome = search.search(&query, tx, CancellationToken::new()).await;
        assert_eq!(outcome, Err(SearchError::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_bounds_the_group() {
        let mut provider = ScriptedProvider::default();
        provider.scripts.insert(
            "[SubsPlease] Show (1080p)".to_string(),
            Script {
                hang: true,
                ..Script::default()
            },
        );
        let search = orchestrator(provider, echo_parser()).with_deadline(Duration::from_secs(2));
        let query = SearchQuery::new("Show", [Resolution::P1080]);

        let (tx, _rx) = mpsc::channel(8);
        let outcome = search.search(&query, tx, CancellationToken::new()).await;
        assert_eq!(outcome, Err(SearchError::DeadlineExceeded { seconds: 2 }));
    }

    #[tokio::test]
    async fn empty_resolution_set_completes_immediately() {
        let search = orchestrator(ScriptedProvider::default(), MockParser::new());
        let query = SearchQuery::new("Show", []);

        let (tx, rx) = mpsc::channel(1);
        let outcome = search.search(&query, tx, CancellationToken::new()).await;
        assert_eq!(outcome, Ok(()));
        assert!(collect(rx).await.is_empty());
    }
}
