//! Plain HTTP(S) implementation of the `DownloadEngine` port.
//!
//! Binding a locator starts the request right away; the response headers
//! provide the metadata (content length and file name). The body is only
//! streamed to disk once `download_all` is called. `BitTorrent` locators
//! are rejected as unsupported.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anirent_core::{ContentInfo, DownloadEngine, EngineError, EngineHandle, ServiceConfig};
use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Notify, watch};
use tokio_util::sync::CancellationToken;
use url::Url;

/// File name used when the URL path has no usable last segment.
const FALLBACK_FILE_NAME: &str = "download";

/// Connect timeout for new transfers.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Download engine for `http://` and `https://` locators.
#[derive(Debug, Clone)]
pub struct HttpEngine {
    client: reqwest::Client,
    data_dir: PathBuf,
}

impl HttpEngine {
    /// Build an engine writing into `config.data_dir`.
    pub fn new(config: &ServiceConfig) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| EngineError::bind("http client", e.to_string()))?;
        Ok(Self::with_client(client, config.data_dir.clone()))
    }

    /// Build an engine around an existing client.
    pub fn with_client(client: reqwest::Client, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            data_dir: data_dir.into(),
        }
    }

    /// Directory transfers are written into.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[async_trait]
impl DownloadEngine for HttpEngine {
    async fn add_source(&self, locator: &str) -> Result<Arc<dyn EngineHandle>, EngineError> {
        let url = Url::parse(locator).map_err(|e| EngineError::bind(locator, e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(EngineError::unsupported(locator));
        }

        let shared = Arc::new(Shared::default());
        let (info_tx, info_rx) = watch::channel(None);
        let cancel = CancellationToken::new();

        let transfer = Transfer {
            client: self.client.clone(),
            url,
            data_dir: self.data_dir.clone(),
            shared: Arc::clone(&shared),
            info: info_tx,
        };
        let token = cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;

                () = token.cancelled() => {}
                () = transfer.run() => {}
            }
        });

        tracing::debug!(target: "anirent.download", locator, "http source bound");
        Ok(Arc::new(HttpHandle {
            shared,
            info: info_rx,
            cancel,
        }))
    }
}

/// State shared between a handle and its transfer task.
#[derive(Debug, Default)]
struct Shared {
    downloaded: AtomicU64,
    start: Notify,
    error: Mutex<Option<EngineError>>,
}

impl Shared {
    fn record_error(&self, err: EngineError) {
        tracing::warn!(target: "anirent.download", error = %err, "http transfer failed");
        *self.error.lock().unwrap_or_else(PoisonError::into_inner) = Some(err);
    }
}

type InfoSlot = Option<Result<ContentInfo, EngineError>>;

struct Transfer {
    client: reqwest::Client,
    url: Url,
    data_dir: PathBuf,
    shared: Arc<Shared>,
    info: watch::Sender<InfoSlot>,
}

impl Transfer {
    async fn run(self) {
        let response = match self.fetch_headers().await {
            Ok(response) => response,
            Err(err) => {
                self.info.send_replace(Some(Err(err)));
                return;
            }
        };

        let Some(total_bytes) = response.content_length() else {
            self.info.send_replace(Some(Err(EngineError::metadata(format!(
                "{} did not report a content length",
                self.url
            )))));
            return;
        };
        let display_path = file_name(&self.url);
        self.info.send_replace(Some(Ok(ContentInfo {
            total_bytes,
            display_path: display_path.clone(),
        })));

        self.shared.start.notified().await;

        let path = self.data_dir.join(&display_path);
        if let Err(err) = self.write_body(response, &path).await {
            self.shared.record_error(err);
        }
    }

    async fn fetch_headers(&self) -> Result<reqwest::Response, EngineError> {
        self.client
            .get(self.url.clone())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| EngineError::metadata(e.to_string()))
    }

    async fn write_body(&self, response: reqwest::Response, path: &Path) -> Result<(), EngineError> {
        tokio::fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|e| EngineError::from_io_error(&e))?;
        let mut file = tokio::fs::File::create(path)
            .await
            .map_err(|e| EngineError::from_io_error(&e))?;

        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| EngineError::transfer(e.to_string()))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| EngineError::from_io_error(&e))?;
            // Count only bytes the OS has accepted, so a completed count
            // means the file is whole.
            file.flush().await.map_err(|e| EngineError::from_io_error(&e))?;
            self.shared
                .downloaded
                .fetch_add(chunk.len() as u64, Ordering::Relaxed);
        }
        Ok(())
    }
}

/// Last non-empty path segment of `url`.
fn file_name(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        .map_or_else(|| FALLBACK_FILE_NAME.to_string(), ToString::to_string)
}

/// Handle to one HTTP transfer.
#[derive(Debug)]
struct HttpHandle {
    shared: Arc<Shared>,
    info: watch::Receiver<InfoSlot>,
    cancel: CancellationToken,
}

#[async_trait]
impl EngineHandle for HttpHandle {
    async fn metadata(&self) -> Result<ContentInfo, EngineError> {
        let mut info = self.info.clone();
        let ready = info
            .wait_for(Option::is_some)
            .await
            .map_err(|_| EngineError::metadata("transfer stopped before metadata"))?;
        match ready.as_ref() {
            Some(res) => res.clone(),
            None => Err(EngineError::metadata("transfer stopped before metadata")),
        }
    }

    fn disallow_upload(&self) {
        // HTTP never serves content to peers.
    }

    fn download_all(&self) {
        self.shared.start.notify_one();
    }

    fn bytes_downloaded(&self) -> Result<u64, EngineError> {
        if let Some(err) = self
            .shared
            .error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            return Err(err);
        }
        Ok(self.shared.downloaded.load(Ordering::Relaxed))
    }

    fn release(&self) {
        self.cancel.cancel();
    }
}

impl Drop for HttpHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_uses_last_path_segment() {
        let url = Url::parse("https://example.com/files/show%20-%2001.mkv?token=1").unwrap();
        assert_eq!(file_name(&url), "show%20-%2001.mkv");

        let url = Url::parse("https://example.com/dir/").unwrap();
        assert_eq!(file_name(&url), "dir");

        let url = Url::parse("https://example.com").unwrap();
        assert_eq!(file_name(&url), FALLBACK_FILE_NAME);
    }

    #[tokio::test]
    async fn magnet_links_are_unsupported() {
        let engine = HttpEngine::with_client(reqwest::Client::new(), std::env::temp_dir());
        let err = engine
            .add_source("magnet:?xt=urn:btih:abc")
            .await
            .err()
            .unwrap();
        assert_eq!(err, EngineError::unsupported("magnet:?xt=urn:btih:abc"));
    }

    #[tokio::test]
    async fn garbage_locator_fails_to_bind() {
        let engine = HttpEngine::with_client(reqwest::Client::new(), std::env::temp_dir());
        let err = engine.add_source("not a url").await.err().unwrap();
        assert!(matches!(err, EngineError::Bind { .. }));
    }
}
