//! Download handler - ticket admission.

use anirent_service::{StructuredResult, TicketId};
use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::HttpError;
use crate::state::AppState;

/// Request to download a search result.
#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    pub result: StructuredResult,
}

/// Response from a successful admission.
#[derive(Debug, Serialize, Deserialize)]
pub struct DownloadResponse {
    /// Ticket id; subscribe at `/api/subscriptions/{id}/events`.
    pub subscription_id: TicketId,
}

/// Admit a download.
///
/// Waits for the admission slot; a client that disconnects while waiting
/// drops this future and nothing is enqueued.
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<DownloadRequest>,
) -> Result<Json<DownloadResponse>, HttpError> {
    let cancel = CancellationToken::new();
    let ticket = state.service.download(req.result, &cancel).await?;
    Ok(Json(DownloadResponse {
        subscription_id: ticket.id,
    }))
}
