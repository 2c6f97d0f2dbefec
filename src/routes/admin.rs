use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use serde::Serialize;

use crate::auth::AdminKey;
use crate::response::{ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/sessions/cleanup", post(cleanup_sessions))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub deleted: u64,
}

/// Run one reaper pass now, independent of the schedule.
async fn cleanup_sessions(
    State(state): State<AppState>,
    _admin: AdminKey,
) -> Result<impl IntoResponse, AppError> {
    let reaper = state.reaper().clone();
    let deleted = tokio::task::spawn_blocking(move || reaper.trigger())
        .await
        .map_err(|e| AppError::internal(&format!("cleanup task failed: {e}")))??;
    Ok(ok(CleanupResponse { deleted }))
}
