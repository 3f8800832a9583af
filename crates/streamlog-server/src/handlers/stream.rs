//! Whole-log byte stream endpoint
//!
//! Streams the raw store bytes of every segment in order, length prefixes
//! included. The consumer re-frames by reading 8-byte big-endian lengths.
//! The stream is a snapshot: records appended after the request starts are
//! not included.

use std::io::Read;

use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use bytes::Bytes;

use streamlog_storage::LogReader;

use crate::AppState;

const CHUNK_SIZE: usize = 64 * 1024;

pub async fn log_bytes(State(state): State<AppState>) -> Response {
    let reader = state.log.reader();

    let stream = futures::stream::try_unfold(reader, |reader| async move {
        let (reader, chunk) = next_chunk(reader).await?;
        if chunk.is_empty() {
            Ok::<_, std::io::Error>(None)
        } else {
            Ok(Some((Bytes::from(chunk), reader)))
        }
    });

    (
        [(header::CONTENT_TYPE, "application/octet-stream")],
        Body::from_stream(stream),
    )
        .into_response()
}

/// Pull one chunk off the blocking reader without stalling the runtime.
async fn next_chunk(mut reader: LogReader) -> std::io::Result<(LogReader, Vec<u8>)> {
    tokio::task::spawn_blocking(move || {
        let mut buf = vec![0u8; CHUNK_SIZE];
        let n = reader.read(&mut buf)?;
        buf.truncate(n);
        Ok((reader, buf))
    })
    .await
    .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?
}
