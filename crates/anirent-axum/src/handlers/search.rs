//! Search handler - streams parsed results as SSE.

use std::convert::Infallible;

use anirent_service::{Resolution, SearchQuery};
use axum::Json;
use axum::extract::State;
use axum::response::sse::{Event, Sse};
use futures_util::StreamExt;
use futures_util::stream::Stream;
use serde::Deserialize;

use crate::error::HttpError;
use crate::sse::{search_event, sse_response};
use crate::state::AppState;

/// Request to search for a title.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub name: String,
    /// Requested resolutions, e.g. `["720p", "1080p"]`. Duplicates collapse.
    #[serde(default)]
    pub resolutions: Vec<Resolution>,
}

/// Start a search.
///
/// Each parsed result is sent as an `event: result`; a failure is sent as a
/// final `event: error`. Disconnecting cancels the search.
pub async fn search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>> + Send + 'static>, HttpError> {
    if req.name.trim().is_empty() {
        return Err(HttpError::BadRequest("search name must not be empty".to_string()));
    }

    let query = SearchQuery::new(req.name, req.resolutions);
    tracing::debug!(target: "anirent.search", name = %query.name, "Search requested over HTTP");

    Ok(sse_response(state.service.search(query).map(search_event)))
}
