//! Integration tests for the Axum web server.
//!
//! These tests verify that routes are correctly wired to the service facade.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anirent_axum::{AxumContext, CorsConfig, create_router, serve};
use anirent_core::{
    ContentInfo, DownloadEngine, EngineError, EngineHandle, NameParser, RawResult, SearchProvider,
};
use anirent_parser::SubsPleaseParser;
use anirent_service::{
    AnirentService, SearchError, ServiceConfig, ServiceDeps, StructuredResult,
};
use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tokio::sync::{Notify, mpsc};
use tower::ServiceExt;

// =============================================================================
// Scripted collaborators
// =============================================================================

/// Returns two hits for 720p queries and fails for 480p ones.
struct FixedProvider;

#[async_trait]
impl SearchProvider for FixedProvider {
    async fn search(
        &self,
        query: &str,
        results: mpsc::Sender<RawResult>,
    ) -> Result<(), SearchError> {
        if query.contains("(480p)") {
            return Err(SearchError::provider("blocked"));
        }
        for (name, link) in [
            ("[SubsPlease] Show - 01 (720p) [AAAA].mkv", "magnet:?xt=1"),
            ("[SubsPlease] Show - 02 (720p) [BBBB].mkv", "magnet:?xt=2"),
        ] {
            if results.send(RawResult::new(name, link)).await.is_err() {
                break;
            }
        }
        Ok(())
    }
}

/// Handle whose metadata is released by the test, then completes in one poll.
struct GatedHandle {
    gate: Arc<Notify>,
    polls: AtomicU64,
}

#[async_trait]
impl EngineHandle for GatedHandle {
    async fn metadata(&self) -> Result<ContentInfo, EngineError> {
        self.gate.notified().await;
        Ok(ContentInfo {
            total_bytes: 64,
            display_path: "show.mkv".to_string(),
        })
    }

    fn disallow_upload(&self) {}

    fn download_all(&self) {}

    fn bytes_downloaded(&self) -> Result<u64, EngineError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        Ok(64)
    }

    fn release(&self) {}
}

struct GatedEngine {
    gate: Arc<Notify>,
}

#[async_trait]
impl DownloadEngine for GatedEngine {
    async fn add_source(&self, locator: &str) -> Result<Arc<dyn EngineHandle>, EngineError> {
        if locator.starts_with("magnet:") {
            return Err(EngineError::unsupported(locator));
        }
        Ok(Arc::new(GatedHandle {
            gate: Arc::clone(&self.gate),
            polls: AtomicU64::new(0),
        }))
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn test_service(gate: Arc<Notify>) -> Arc<AnirentService> {
    let config = ServiceConfig::default()
        .with_data_dir("/srv/anirent")
        .with_poll_interval(Duration::from_secs(1));
    let deps = ServiceDeps::new(
        Arc::new(FixedProvider),
        Arc::new(SubsPleaseParser::new()),
        Arc::new(GatedEngine { gate }),
    );
    Arc::new(AnirentService::new(deps, &config))
}

fn app(service: &Arc<AnirentService>) -> Router {
    create_router(AxumContext::new(Arc::clone(service)), &CorsConfig::AllowAll)
}

fn episode() -> StructuredResult {
    episode_at("https://example.com/show.mkv")
}

fn episode_at(locator: &str) -> StructuredResult {
    SubsPleaseParser::new()
        .parse("[SubsPlease] Show - 01 (720p) [AAAA].mkv")
        .unwrap()
        .with_locator(locator)
}

fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// `event:` names of an SSE body, in order, ignoring keep-alive comments.
fn event_names(body: &str) -> Vec<&str> {
    body.lines()
        .filter_map(|line| line.strip_prefix("event: "))
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let service = test_service(Arc::new(Notify::new()));

    let response = app(&service).oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "OK");
}

#[tokio::test]
async fn search_streams_results_as_sse() {
    let service = test_service(Arc::new(Notify::new()));

    let response = app(&service)
        .oneshot(post_json(
            "/api/search",
            &serde_json::json!({ "name": "Show", "resolutions": ["720p"] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );

    let body = body_string(response).await;
    assert_eq!(event_names(&body), vec!["result", "result"]);
    assert!(body.contains("\"locator\":\"magnet:?xt=1\""));
    assert!(body.contains("\"locator\":\"magnet:?xt=2\""));
}

#[tokio::test]
async fn search_failure_ends_with_error_event() {
    let service = test_service(Arc::new(Notify::new()));

    let response = app(&service)
        .oneshot(post_json(
            "/api/search",
            &serde_json::json!({ "name": "Show", "resolutions": ["480p"] }),
        ))
        .await
        .unwrap();

    let body = body_string(response).await;
    assert_eq!(event_names(&body), vec!["error"]);
    assert!(body.contains("data: search provider failed: blocked"));
}

#[tokio::test]
async fn empty_search_name_is_a_bad_request() {
    let service = test_service(Arc::new(Notify::new()));

    let response = app(&service)
        .oneshot(post_json(
            "/api/search",
            &serde_json::json!({ "name": "  ", "resolutions": ["720p"] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["status"], 400);
    assert_eq!(body["error"], "search name must not be empty");
}

#[tokio::test(start_paused = true)]
async fn download_then_subscribe_streams_lifecycle() {
    let gate = Arc::new(Notify::new());
    let service = test_service(Arc::clone(&gate));

    let response = app(&service)
        .oneshot(post_json(
            "/api/downloads",
            &serde_json::json!({ "result": episode() }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    let id = body["subscription_id"].as_str().unwrap().to_string();

    let response = app(&service)
        .oneshot(get(&format!("/api/subscriptions/{id}/events")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Subscribed; now let the transfer begin.
    gate.notify_one();

    let body = body_string(response).await;
    assert_eq!(event_names(&body), vec!["started", "progress", "completed"]);
    assert!(body.contains(&format!("\"ticket_id\":\"{id}\"")));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn finished_download_still_reports_its_failure() {
    let service = test_service(Arc::new(Notify::new()));

    let response = app(&service)
        .oneshot(post_json(
            "/api/downloads",
            &serde_json::json!({ "result": episode_at("magnet:?xt=urn:btih:abc") }),
        ))
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    let id = body["subscription_id"].as_str().unwrap().to_string();

    for _ in 0..100 {
        if service.active_downloads() == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let response = app(&service)
        .oneshot(get(&format!("/api/subscriptions/{id}/events")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert_eq!(event_names(&body), vec!["failure"]);
    assert!(body.contains("unsupported locator"));
}

#[tokio::test]
async fn unknown_subscription_is_not_found() {
    let service = test_service(Arc::new(Notify::new()));

    let response = app(&service)
        .oneshot(get("/api/subscriptions/does-not-exist/events"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["status"], 404);
}

#[tokio::test]
async fn downloads_after_shutdown_are_unavailable() {
    let service = test_service(Arc::new(Notify::new()));
    service.shutdown();

    let response = app(&service)
        .oneshot(post_json(
            "/api/downloads",
            &serde_json::json!({ "result": episode() }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn serve_returns_after_shutdown_and_drain() {
    let service = test_service(Arc::new(Notify::new()));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();

    let server = tokio::spawn(serve(
        AxumContext::new(Arc::clone(&service)),
        listener,
        CorsConfig::AllowAll,
    ));
    tokio::task::yield_now().await;

    service.shutdown();
    let outcome = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server stops after shutdown")
        .unwrap();
    assert!(outcome.is_ok());
    assert_eq!(service.active_downloads(), 0);
}
