//! Conversion of service streams into Server-Sent Events.

use std::convert::Infallible;
use std::time::Duration;

use anirent_service::{DownloadEvent, SearchError, StructuredResult};
use axum::response::sse::{Event, KeepAlive, KeepAliveStream, Sse};
use futures_util::stream::Stream;
use serde::Serialize;

/// Interval between keep-alive comments on idle streams.
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// Wrap `stream` in an SSE response with a keep-alive ping.
pub fn sse_response<S>(stream: S) -> Sse<KeepAliveStream<S>>
where
    S: Stream<Item = Result<Event, Infallible>> + Send + 'static,
{
    Sse::new(stream).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL).text("ping"))
}

/// `event: result` with the JSON result, or `event: error` with the message.
pub fn search_event(item: Result<StructuredResult, SearchError>) -> Result<Event, Infallible> {
    Ok(match item {
        Ok(result) => json_event("result", &result),
        Err(err) => Event::default().event("error").data(err.to_string()),
    })
}

/// One download event, named after its payload kind and tagged with its id.
pub fn download_event(event: DownloadEvent) -> Result<Event, Infallible> {
    Ok(json_event(event.kind(), &event).id(event.id.clone()))
}

fn json_event<T: Serialize>(name: &str, value: &T) -> Event {
    match serde_json::to_string(value) {
        Ok(json) => Event::default().event(name).data(json),
        Err(e) => {
            tracing::warn!("Failed to serialize {name} event: {e}");
            Event::default().event("error").data(e.to_string())
        }
    }
}
