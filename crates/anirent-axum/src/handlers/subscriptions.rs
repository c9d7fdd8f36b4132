//! Subscription handler - streams a ticket's lifecycle events as SSE.

use std::convert::Infallible;

use anirent_service::TicketId;
use axum::extract::{Path, State};
use axum::response::sse::{Event, Sse};
use futures_util::StreamExt;
use futures_util::stream::Stream;

use crate::error::HttpError;
use crate::sse::{download_event, sse_response};
use crate::state::AppState;

/// Stream events of one ticket until its terminal event.
///
/// A finished ticket yields its terminal event; unknown tickets answer 404.
pub async fn events(
    State(state): State<AppState>,
    Path(id): Path<TicketId>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>> + Send + 'static>, HttpError> {
    let subscription = state.service.subscribe(&id)?;
    Ok(sse_response(subscription.map(download_event)))
}
