//! Operator endpoints: offset range, truncation, health

use axum::{extract::State, http::StatusCode, Json};
use tracing::info;

use crate::models::{OffsetsResponse, TruncateRequest};
use crate::{error_status, AppState};

pub async fn health() -> &'static str {
    "OK"
}

/// Current offset range of the log.
pub async fn offsets(
    State(state): State<AppState>,
) -> Result<Json<OffsetsResponse>, StatusCode> {
    let log = state.log.clone();
    let (lowest, highest) = tokio::task::spawn_blocking(move || {
        let lowest = log.lowest_offset()?;
        let highest = log.highest_offset()?;
        Ok::<_, streamlog_core::Error>((lowest, highest))
    })
    .await
    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    .map_err(|err| error_status(&err))?;

    Ok(Json(OffsetsResponse { lowest, highest }))
}

/// Drop every segment whose records are all at or below `lowest`.
pub async fn truncate(
    State(state): State<AppState>,
    Json(req): Json<TruncateRequest>,
) -> Result<StatusCode, StatusCode> {
    let log = state.log.clone();
    tokio::task::spawn_blocking(move || log.truncate(req.lowest))
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .map_err(|err| error_status(&err))?;

    info!(lowest = req.lowest, "truncate requested");
    Ok(StatusCode::NO_CONTENT)
}
