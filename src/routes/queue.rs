use axum::extract::{Path, State};
use axum::Json;
use serde_json::json;

use crate::error::AppError;
use crate::models::QueuedAction;
use crate::queue::DrainReport;
use crate::state::SharedState;

pub async fn list(State(state): State<SharedState>) -> Result<Json<Vec<QueuedAction>>, AppError> {
    let pending = state.queue.pending().await?;
    Ok(Json(pending))
}

pub async fn clear(State(state): State<SharedState>) -> Result<Json<serde_json::Value>, AppError> {
    let removed = state.queue.clear().await?;
    Ok(Json(json!({ "removed": removed })))
}

pub async fn remove(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !state.queue.remove(id).await? {
        return Err(AppError::NotFound(format!("Queued action {id} not found")));
    }
    Ok(Json(json!({ "removed": id })))
}

/// Drain right away regardless of the connectivity signal.
pub async fn drain(State(state): State<SharedState>) -> Result<Json<DrainReport>, AppError> {
    let report = state.queue.drain(state.replayer.as_ref()).await?;
    Ok(Json(report))
}
