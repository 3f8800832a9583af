//! Request and response bodies for the record API

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ProduceRequest {
    pub value: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProduceResponse {
    pub offset: u64,
}

#[derive(Debug, Deserialize)]
pub struct ProduceBatchRequest {
    pub values: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProduceBatchResponse {
    pub offsets: Vec<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConsumedRecord {
    pub offset: u64,
    pub value: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConsumeResponse {
    pub records: Vec<ConsumedRecord>,
    /// Offset to pass as `from` on the next request
    pub next_offset: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OffsetsResponse {
    pub lowest: u64,
    pub highest: u64,
}

#[derive(Debug, Deserialize)]
pub struct TruncateRequest {
    pub lowest: u64,
}
