//! Record Serialization Contract
//!
//! The storage engine never interprets record payloads; it delegates the
//! mapping between `Record` and raw bytes to a codec supplied by the request
//! layer. The only requirements are that encoding is deterministic and that
//! `decode(encode(r))` restores the same value bytes.
//!
//! ## ValueCodec
//! The default codec frames a record as exactly its value bytes. The offset
//! is not part of the frame: it is reconstructed from the index entry on
//! read, so the on-disk store is a plain concatenation of length-prefixed
//! values. This keeps the whole-log byte stream trivially re-frameable by
//! reading 8-byte big-endian lengths.
//!
//! A request layer that needs richer framing (headers, schema IDs, embedded
//! offsets) supplies its own `RecordCodec` implementation via
//! `Log::with_codec`; the engine treats the output as opaque either way.

use bytes::Bytes;

use crate::error::Result;
use crate::record::Record;

/// Maps records to and from their on-disk byte representation
pub trait RecordCodec: Send + Sync {
    /// Serialize a record to the bytes stored in a segment's store file.
    ///
    /// The record's offset has already been stamped when this is called.
    fn encode(&self, record: &Record) -> Bytes;

    /// Parse bytes previously produced by `encode`.
    ///
    /// The returned record's offset is advisory; the segment overwrites it
    /// with the offset derived from the index entry.
    fn decode(&self, bytes: &[u8]) -> Result<Record>;
}

/// Identity codec: the frame is the record's value, nothing else
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueCodec;

impl RecordCodec for ValueCodec {
    fn encode(&self, record: &Record) -> Bytes {
        record.value.clone()
    }

    fn decode(&self, bytes: &[u8]) -> Result<Record> {
        Ok(Record::new(Bytes::copy_from_slice(bytes)))
    }
}
