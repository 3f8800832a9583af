//! Segment - One Store/Index Pair Covering a Contiguous Offset Range
//!
//! A segment couples one store file with one index file and presents them as
//! a single range of absolute offsets. The segment owns offset assignment:
//! every append stamps the record with `next_offset`, writes the frame to the
//! store, records `(relative offset, position)` in the index, and advances.
//!
//! ## File Naming
//!
//! Both files live in the log's directory and are named by the segment's
//! base offset in decimal: `{base}.store` and `{base}.index`. The base
//! offset is the sole identifier; the log rebuilds its segment sequence from
//! these names on startup.
//!
//! ## Recovery
//!
//! On open, `next_offset` is derived from the index's last entry: an empty
//! index means a fresh segment starting at `base_offset`, otherwise the next
//! offset is `base + last_relative + 1`.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use streamlog_core::{Error, Record, RecordCodec, Result};

use crate::config::SegmentConfig;
use crate::index::Index;
use crate::store::Store;

/// One store/index pair and its offset range
pub struct Segment {
    store: Arc<Store>,
    index: Index,
    base_offset: u64,
    next_offset: u64,
    config: SegmentConfig,
    codec: Arc<dyn RecordCodec>,
}

impl Segment {
    /// Open or create the segment with the given base offset in `dir`.
    pub fn open(
        dir: &Path,
        base_offset: u64,
        config: SegmentConfig,
        codec: Arc<dyn RecordCodec>,
    ) -> Result<Self> {
        let store = Arc::new(Store::open(dir.join(format!("{base_offset}.store")))?);
        let index = Index::open(dir.join(format!("{base_offset}.index")), &config)?;

        let next_offset = match index.read(-1) {
            Ok((relative, _)) => base_offset + relative as u64 + 1,
            Err(Error::EndOfIndex) => base_offset,
            Err(err) => return Err(err),
        };

        Ok(Self {
            store,
            index,
            base_offset,
            next_offset,
            config,
            codec,
        })
    }

    /// Append a record, stamping and returning its absolute offset.
    ///
    /// The store write happens before the index write. If the index write
    /// fails the frame stays in the store unreferenced; the next open still
    /// recovers a consistent size from the file length, so the bytes are
    /// leaked, not corrupting.
    pub fn append(&mut self, record: &mut Record) -> Result<u64> {
        let offset = self.next_offset;
        record.offset = offset;

        let encoded = self.codec.encode(record);
        let (_, position) = self.store.append(&encoded)?;
        self.index
            .write((offset - self.base_offset) as u32, position)?;

        self.next_offset += 1;
        Ok(offset)
    }

    /// Read the record at absolute offset `offset`.
    pub fn read(&self, offset: u64) -> Result<Record> {
        let relative = offset
            .checked_sub(self.base_offset)
            .ok_or(Error::OffsetOutOfRange(offset))?;

        let (_, position) = self.index.read(relative as i64).map_err(|err| match err {
            Error::EndOfIndex => Error::OffsetOutOfRange(offset),
            other => other,
        })?;

        let bytes = self.store.read(position)?;
        let mut record = self.codec.decode(&bytes)?;
        record.offset = offset;
        Ok(record)
    }

    /// True once either file has reached its threshold or the index has no
    /// room for another entry.
    ///
    /// Both thresholds matter: tiny records exhaust the index before the
    /// store, large records the reverse.
    pub fn is_maxed(&self) -> bool {
        self.store.size() >= self.config.max_store_bytes
            || self.index.size() >= self.config.max_index_bytes
            || self.index.is_maxed()
    }

    /// True when `offset` falls inside this segment's assigned range.
    pub fn contains(&self, offset: u64) -> bool {
        self.base_offset <= offset && offset < self.next_offset
    }

    pub fn base_offset(&self) -> u64 {
        self.base_offset
    }

    pub fn next_offset(&self) -> u64 {
        self.next_offset
    }

    /// Shared handle to the underlying store, for the whole-log reader.
    pub(crate) fn store(&self) -> Arc<Store> {
        Arc::clone(&self.store)
    }

    pub(crate) fn store_size(&self) -> u64 {
        self.store.size()
    }

    /// Close the index first (sync + truncate), then flush the store.
    ///
    /// The index truncation is the authoritative record of its length for
    /// the next open and must complete before the store is released.
    pub fn close(self) -> Result<()> {
        self.index.close()?;
        self.store.close()?;
        Ok(())
    }

    /// Close the segment and delete both backing files.
    pub fn remove(self) -> Result<()> {
        let index_path = self.index.path().to_path_buf();
        let store_path = self.store.path().to_path_buf();

        self.close()?;
        fs::remove_file(index_path)?;
        fs::remove_file(store_path)?;
        Ok(())
    }
}
