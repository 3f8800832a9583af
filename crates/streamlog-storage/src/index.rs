//! Index File - Fixed-Stride Offset Table
//!
//! The index maps a record's relative offset to the byte position of its
//! frame in the store. Entries are fixed-width, so both writes and reads are
//! constant-time arithmetic into a shared read/write memory mapping; no
//! per-entry syscalls.
//!
//! ## Entry Format
//!
//! ```text
//! ┌──────────────────────┬──────────────────┐
//! │ Relative Offset      │ Store Position   │
//! │ (4 bytes BE, u32)    │ (8 bytes BE, u64)│
//! └──────────────────────┴──────────────────┘
//! ```
//!
//! ## Pre-Extension and Truncation
//!
//! A memory mapping cannot grow, so the backing file is extended to
//! `max_index_bytes` when the index opens and the mapping covers the whole
//! region. On close the mapping is synced and dropped, and the file is
//! truncated back to the bytes actually written. The on-disk length is the
//! authoritative record of how many entries exist, which is how `size` is
//! recovered on the next open. A process that dies without closing its index
//! leaves a pre-extended file behind; recovering from that is out of scope.
//!
//! ## Concurrency
//!
//! The index carries no lock of its own. It is only reached through its
//! owning segment, and the log's readers-writer lock already serializes
//! writers against everything else.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use memmap2::MmapMut;

use streamlog_core::{Error, Result};

use crate::config::SegmentConfig;

pub(crate) const OFFSET_WIDTH: u64 = 4;
pub(crate) const POSITION_WIDTH: u64 = 8;
pub(crate) const ENTRY_WIDTH: u64 = OFFSET_WIDTH + POSITION_WIDTH;

/// Memory-mapped table of `(relative offset, store position)` entries
pub struct Index {
    file: File,
    path: PathBuf,
    mmap: MmapMut,
    /// Bytes of entries actually written; always a multiple of `ENTRY_WIDTH`
    size: u64,
}

impl Index {
    /// Open or create the index file at `path`.
    ///
    /// `size` is taken from the current file length before the file is
    /// pre-extended to `max_index_bytes` for the mapping.
    pub fn open(path: impl AsRef<Path>, config: &SegmentConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)?;

        let size = file.metadata()?.len();
        file.set_len(config.max_index_bytes)?;
        let mmap = unsafe { MmapMut::map_mut(&file)? };

        Ok(Self {
            file,
            path,
            mmap,
            size,
        })
    }

    /// Append one entry.
    ///
    /// The segment calls this with strictly increasing relative offsets
    /// starting at zero; the index itself only checks capacity.
    pub fn write(&mut self, offset: u32, position: u64) -> Result<()> {
        if self.is_maxed() {
            return Err(Error::IndexFull);
        }

        let at = self.size as usize;
        self.mmap[at..at + OFFSET_WIDTH as usize].copy_from_slice(&offset.to_be_bytes());
        self.mmap[at + OFFSET_WIDTH as usize..at + ENTRY_WIDTH as usize]
            .copy_from_slice(&position.to_be_bytes());

        self.size += ENTRY_WIDTH;
        Ok(())
    }

    /// Read entry `entry`, or the last entry when `entry == -1`.
    ///
    /// Returns `(relative offset, store position)`. Fails with `EndOfIndex`
    /// when the index is empty or the entry lies past the written region.
    pub fn read(&self, entry: i64) -> Result<(u32, u64)> {
        if self.size == 0 {
            return Err(Error::EndOfIndex);
        }

        let entry = if entry == -1 {
            self.size / ENTRY_WIDTH - 1
        } else if entry < 0 {
            return Err(Error::EndOfIndex);
        } else {
            entry as u64
        };

        let at = entry * ENTRY_WIDTH;
        if self.size < at + ENTRY_WIDTH {
            return Err(Error::EndOfIndex);
        }

        let at = at as usize;
        let mut offset_buf = [0u8; OFFSET_WIDTH as usize];
        offset_buf.copy_from_slice(&self.mmap[at..at + OFFSET_WIDTH as usize]);
        let mut position_buf = [0u8; POSITION_WIDTH as usize];
        position_buf
            .copy_from_slice(&self.mmap[at + OFFSET_WIDTH as usize..at + ENTRY_WIDTH as usize]);

        Ok((
            u32::from_be_bytes(offset_buf),
            u64::from_be_bytes(position_buf),
        ))
    }

    /// True when the mapping has no room for another entry.
    pub fn is_maxed(&self) -> bool {
        (self.mmap.len() as u64) < self.size + ENTRY_WIDTH
    }

    /// Bytes of entries written so far.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Path of the backing file, used by segment removal.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sync the mapping, then shrink the file back to the written entries.
    ///
    /// The mapping must be gone before the file is truncated, so this
    /// consumes the index. The truncated length is what the next open reads
    /// back as `size`.
    pub fn close(self) -> Result<()> {
        let Index {
            file, mmap, size, ..
        } = self;

        mmap.flush()?;
        drop(mmap);

        file.sync_all()?;
        file.set_len(size)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config() -> SegmentConfig {
        SegmentConfig {
            max_index_bytes: 1024,
            ..Default::default()
        }
    }

    #[test]
    fn test_write_read_entries() {
        let dir = TempDir::new().unwrap();
        let mut index = Index::open(dir.path().join("0.index"), &test_config()).unwrap();

        let entries = [(0u32, 0u64), (1, 19), (2, 38)];
        for (offset, position) in entries {
            index.write(offset, position).unwrap();
        }

        for (i, (offset, position)) in entries.iter().enumerate() {
            let (got_offset, got_position) = index.read(i as i64).unwrap();
            assert_eq!(got_offset, *offset);
            assert_eq!(got_position, *position);
        }
    }

    #[test]
    fn test_read_empty_is_end_of_index() {
        let dir = TempDir::new().unwrap();
        let index = Index::open(dir.path().join("0.index"), &test_config()).unwrap();

        assert!(matches!(index.read(-1), Err(Error::EndOfIndex)));
        assert!(matches!(index.read(0), Err(Error::EndOfIndex)));
    }

    #[test]
    fn test_read_last_entry() {
        let dir = TempDir::new().unwrap();
        let mut index = Index::open(dir.path().join("0.index"), &test_config()).unwrap();

        index.write(0, 0).unwrap();
        index.write(1, 27).unwrap();

        let (offset, position) = index.read(-1).unwrap();
        assert_eq!(offset, 1);
        assert_eq!(position, 27);
    }

    #[test]
    fn test_read_past_written_is_end_of_index() {
        let dir = TempDir::new().unwrap();
        let mut index = Index::open(dir.path().join("0.index"), &test_config()).unwrap();
        index.write(0, 0).unwrap();

        assert!(matches!(index.read(1), Err(Error::EndOfIndex)));
    }

    #[test]
    fn test_write_past_capacity_is_index_full() {
        let dir = TempDir::new().unwrap();
        let config = SegmentConfig {
            max_index_bytes: 2 * ENTRY_WIDTH,
            ..Default::default()
        };
        let mut index = Index::open(dir.path().join("0.index"), &config).unwrap();

        index.write(0, 0).unwrap();
        index.write(1, 19).unwrap();
        assert!(index.is_maxed());
        assert!(matches!(index.write(2, 38), Err(Error::IndexFull)));
    }

    #[test]
    fn test_undersized_capacity_rejects_first_write() {
        let dir = TempDir::new().unwrap();
        let config = SegmentConfig {
            max_index_bytes: ENTRY_WIDTH - 4,
            ..Default::default()
        };
        let mut index = Index::open(dir.path().join("0.index"), &config).unwrap();

        assert!(index.is_maxed());
        assert!(matches!(index.write(0, 0), Err(Error::IndexFull)));
        assert_eq!(index.size(), 0);
    }

    #[test]
    fn test_file_pre_extended_then_truncated_on_close() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("0.index");
        let mut index = Index::open(&path, &test_config()).unwrap();

        assert_eq!(std::fs::metadata(&path).unwrap().len(), 1024);

        index.write(0, 0).unwrap();
        index.write(1, 19).unwrap();
        index.close().unwrap();

        assert_eq!(std::fs::metadata(&path).unwrap().len(), 2 * ENTRY_WIDTH);
    }

    #[test]
    fn test_entries_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("0.index");

        let mut index = Index::open(&path, &test_config()).unwrap();
        index.write(0, 0).unwrap();
        index.write(1, 42).unwrap();
        index.close().unwrap();

        let reopened = Index::open(&path, &test_config()).unwrap();
        assert_eq!(reopened.size(), 2 * ENTRY_WIDTH);
        assert_eq!(reopened.read(-1).unwrap(), (1, 42));
        assert_eq!(reopened.read(0).unwrap(), (0, 0));
    }
}
