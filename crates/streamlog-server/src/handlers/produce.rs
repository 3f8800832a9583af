//! Record produce endpoints

use axum::{extract::State, http::StatusCode, Json};
use bytes::Bytes;
use tracing::debug;

use streamlog_core::Record;

use crate::models::{
    ProduceBatchRequest, ProduceBatchResponse, ProduceRequest, ProduceResponse,
};
use crate::{error_status, AppState};

pub async fn produce(
    State(state): State<AppState>,
    Json(req): Json<ProduceRequest>,
) -> Result<Json<ProduceResponse>, StatusCode> {
    let log = state.log.clone();
    let offset = tokio::task::spawn_blocking(move || {
        let mut record = Record::new(Bytes::from(req.value));
        log.append(&mut record)
    })
    .await
    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    .map_err(|err| error_status(&err))?;

    debug!(offset, "record produced");
    Ok(Json(ProduceResponse { offset }))
}

/// Append a batch of values in order, returning the offset of each.
///
/// Appends are sequential; a mid-batch failure reports the error without
/// un-appending the records already written.
pub async fn produce_batch(
    State(state): State<AppState>,
    Json(req): Json<ProduceBatchRequest>,
) -> Result<Json<ProduceBatchResponse>, StatusCode> {
    let log = state.log.clone();
    let offsets = tokio::task::spawn_blocking(move || {
        let mut offsets = Vec::with_capacity(req.values.len());
        for value in req.values {
            let mut record = Record::new(Bytes::from(value));
            offsets.push(log.append(&mut record)?);
        }
        Ok::<_, streamlog_core::Error>(offsets)
    })
    .await
    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    .map_err(|err| error_status(&err))?;

    debug!(count = offsets.len(), "batch produced");
    Ok(Json(ProduceBatchResponse { offsets }))
}
