//! streamlog HTTP Record Service
//!
//! HTTP/JSON API over the storage engine:
//! - Producer operations (append single records or batches)
//! - Consumer operations (read by offset, batch consume from an offset)
//! - Operator operations (offset range, prefix truncation)
//! - Whole-log byte stream for snapshot shipping
//!
//! The engine is synchronous disk I/O; every handler hops onto the blocking
//! thread pool before touching it.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};

use streamlog_core::Error;
use streamlog_storage::Log;

pub mod handlers;
pub mod models;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub log: Arc<Log>,
}

/// Create the API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/records",
            post(handlers::produce::produce).get(handlers::consume::consume),
        )
        .route("/records/batch", post(handlers::produce::produce_batch))
        .route("/records/:offset", get(handlers::consume::get_record))
        .route("/offsets", get(handlers::admin::offsets))
        .route("/truncate", post(handlers::admin::truncate))
        .route("/log/bytes", get(handlers::stream::log_bytes))
        .route("/health", get(handlers::admin::health))
        .with_state(state)
}

/// Map engine errors onto HTTP status codes.
///
/// Only `OffsetOutOfRange` is distinguishable by clients; everything else is
/// an internal failure.
pub(crate) fn error_status(err: &Error) -> StatusCode {
    match err {
        Error::OffsetOutOfRange(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
