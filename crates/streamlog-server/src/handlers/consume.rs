//! Record consume endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use streamlog_core::Error;

use crate::models::{ConsumeResponse, ConsumedRecord};
use crate::{error_status, AppState};

#[derive(Debug, Deserialize)]
pub struct ConsumeQuery {
    #[serde(default)]
    pub from: u64,
    #[serde(default = "default_max_records")]
    pub max_records: usize,
}

fn default_max_records() -> usize {
    100
}

/// Read a single record by offset.
pub async fn get_record(
    State(state): State<AppState>,
    Path(offset): Path<u64>,
) -> Result<Json<ConsumedRecord>, StatusCode> {
    let log = state.log.clone();
    let record = tokio::task::spawn_blocking(move || log.read(offset))
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .map_err(|err| error_status(&err))?;

    Ok(Json(ConsumedRecord {
        offset: record.offset,
        value: String::from_utf8_lossy(&record.value).to_string(),
    }))
}

/// Batch consume starting at `from`, stopping at `max_records` or the end
/// of the log, whichever comes first.
pub async fn consume(
    State(state): State<AppState>,
    Query(query): Query<ConsumeQuery>,
) -> Result<Json<ConsumeResponse>, StatusCode> {
    let log = state.log.clone();
    let from = query.from;
    let max_records = query.max_records;
    let records = tokio::task::spawn_blocking(move || {
        let mut records = Vec::new();
        let mut offset = from;
        while records.len() < max_records {
            match log.read(offset) {
                Ok(record) => {
                    records.push(ConsumedRecord {
                        offset: record.offset,
                        value: String::from_utf8_lossy(&record.value).to_string(),
                    });
                    offset += 1;
                }
                Err(Error::OffsetOutOfRange(_)) => break,
                Err(err) => return Err(err),
            }
        }
        Ok(records)
    })
    .await
    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    .map_err(|err| error_status(&err))?;

    let next_offset = records.last().map(|record| record.offset + 1).unwrap_or(from);
    Ok(Json(ConsumeResponse {
        records,
        next_offset,
    }))
}
