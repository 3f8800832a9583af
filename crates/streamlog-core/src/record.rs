//! Record Data Structure
//!
//! This module defines the core `Record` type - the fundamental unit of data
//! in streamlog.
//!
//! ## What is a Record?
//! A record is a single entry in the commit log:
//! - **offset**: unique, monotonically increasing ID assigned by the log
//! - **value**: the actual payload (arbitrary bytes)
//!
//! ## Design Decisions
//! - Uses `bytes::Bytes` for zero-copy operations (no allocations when slicing)
//! - Implements `Serialize`/`Deserialize` for transport use
//! - The log neither parses nor validates `value`; it stores whatever bytes
//!   the caller supplies
//! - Offset is u64 to support very large logs
//!
//! ## Offset Assignment
//! Callers construct a record with `Record::new` (offset zero) and hand it to
//! the log, which stamps the assigned offset onto the record during append.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A single record in the commit log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Offset of this record in the log
    pub offset: u64,

    /// Value (payload)
    pub value: Bytes,
}

impl Record {
    /// Create a record awaiting offset assignment
    pub fn new(value: Bytes) -> Self {
        Self { offset: 0, value }
    }

    /// Create a record at a known offset
    pub fn with_offset(offset: u64, value: Bytes) -> Self {
        Self { offset, value }
    }
}
