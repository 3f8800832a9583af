//! Store File - Length-Prefixed Record Frames
//!
//! The store is the bottom layer of the engine: one append-only file holding
//! a concatenation of frames, where a frame is an 8-byte big-endian length
//! followed by that many payload bytes. There is no file header, terminator,
//! or checksum; the byte position of a frame is its stable identity for the
//! life of the file.
//!
//! ## File Format
//!
//! ```text
//! ┌──────────────┬───────────┬──────────────┬───────────┬─────┐
//! │ Length       │ Payload   │ Length       │ Payload   │ ... │
//! │ (8 bytes BE) │ (N bytes) │ (8 bytes BE) │ (M bytes) │     │
//! └──────────────┴───────────┴──────────────┴───────────┴─────┘
//! ```
//!
//! ## Write Path
//!
//! Appends go through a buffered writer to amortize small writes. Readers
//! must observe recently appended frames, so every read flushes the buffer
//! first; reads are rare relative to appends and this keeps the model simple
//! (no dirty-tail tracking).
//!
//! ## Concurrency
//!
//! A single mutex guards the writer and the logical size. Reads take the
//! same mutex because flushing the buffer is a mutation.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use parking_lot::Mutex;

use streamlog_core::Result;

/// Width of the big-endian length prefix on every frame
pub(crate) const LEN_WIDTH: u64 = 8;

/// Append-only file of length-prefixed frames
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    writer: BufWriter<File>,
    /// Logical end of file; the next frame starts here
    size: u64,
}

impl Store {
    /// Open or create the store file at `path`.
    ///
    /// The logical size is recovered from the on-disk file length, so an
    /// existing store continues appending after its last frame.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;
        let size = file.metadata()?.len();

        Ok(Self {
            path,
            inner: Mutex::new(Inner {
                writer: BufWriter::new(file),
                size,
            }),
        })
    }

    /// Append one frame, returning `(bytes_written, position)`.
    ///
    /// `position` is the file offset where the frame header begins; the
    /// index records it so reads can seek straight to the frame.
    pub fn append(&self, payload: &[u8]) -> Result<(u64, u64)> {
        let mut inner = self.inner.lock();

        let position = inner.size;
        inner.writer.write_all(&(payload.len() as u64).to_be_bytes())?;
        inner.writer.write_all(payload)?;

        let written = LEN_WIDTH + payload.len() as u64;
        inner.size += written;

        Ok((written, position))
    }

    /// Read the payload of the frame starting at `position`.
    pub fn read(&self, position: u64) -> Result<Bytes> {
        let mut inner = self.inner.lock();
        inner.writer.flush()?;

        let file = inner.writer.get_ref();
        let mut len_buf = [0u8; LEN_WIDTH as usize];
        file.read_exact_at(&mut len_buf, position)?;

        let len = u64::from_be_bytes(len_buf);
        let mut payload = vec![0u8; len as usize];
        file.read_exact_at(&mut payload, position + LEN_WIDTH)?;

        Ok(Bytes::from(payload))
    }

    /// Positional read of raw store bytes into `buf`.
    ///
    /// Used by the whole-log byte stream; returns the number of bytes read
    /// (zero at end of file).
    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        let mut inner = self.inner.lock();
        inner.writer.flush()?;

        Ok(inner.writer.get_ref().read_at(buf, offset)?)
    }

    /// Logical size in bytes (includes buffered, not-yet-flushed frames).
    pub fn size(&self) -> u64 {
        self.inner.lock().size
    }

    /// Flush buffered frames to the file.
    ///
    /// The file handle itself is released when the store is dropped.
    pub fn close(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.writer.flush()?;
        Ok(())
    }

    /// Path of the backing file, used by segment removal.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_append_read_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("0.store")).unwrap();

        let (written, position) = store.append(b"hello world").unwrap();
        assert_eq!(written, LEN_WIDTH + 11);
        assert_eq!(position, 0);

        let payload = store.read(position).unwrap();
        assert_eq!(payload, Bytes::from("hello world"));
    }

    #[test]
    fn test_positions_advance_by_frame_size() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("0.store")).unwrap();

        let (_, first) = store.append(b"aaa").unwrap();
        let (_, second) = store.append(b"bb").unwrap();
        assert_eq!(first, 0);
        assert_eq!(second, LEN_WIDTH + 3);
        assert_eq!(store.size(), (LEN_WIDTH + 3) + (LEN_WIDTH + 2));
    }

    #[test]
    fn test_read_any_frame() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("0.store")).unwrap();

        let mut positions = Vec::new();
        for payload in [&b"one"[..], b"two", b"three"] {
            let (_, pos) = store.append(payload).unwrap();
            positions.push(pos);
        }

        assert_eq!(store.read(positions[2]).unwrap(), Bytes::from("three"));
        assert_eq!(store.read(positions[0]).unwrap(), Bytes::from("one"));
        assert_eq!(store.read(positions[1]).unwrap(), Bytes::from("two"));
    }

    #[test]
    fn test_empty_payload() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("0.store")).unwrap();

        let (written, position) = store.append(b"").unwrap();
        assert_eq!(written, LEN_WIDTH);
        assert_eq!(store.read(position).unwrap(), Bytes::new());
    }

    #[test]
    fn test_size_recovered_on_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("0.store");

        let store = Store::open(&path).unwrap();
        let (_, first) = store.append(b"persisted").unwrap();
        store.close().unwrap();
        drop(store);

        let reopened = Store::open(&path).unwrap();
        assert_eq!(reopened.size(), LEN_WIDTH + 9);
        assert_eq!(reopened.read(first).unwrap(), Bytes::from("persisted"));

        let (_, second) = reopened.append(b"more").unwrap();
        assert_eq!(second, LEN_WIDTH + 9);
    }

    #[test]
    fn test_read_past_end_errors() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("0.store")).unwrap();
        store.append(b"only").unwrap();

        assert!(store.read(1000).is_err());
    }

    #[test]
    fn test_read_at_sees_frame_header() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("0.store")).unwrap();
        store.append(b"A").unwrap();

        let mut buf = [0u8; 9];
        let n = store.read_at(&mut buf, 0).unwrap();
        assert_eq!(n, 9);
        assert_eq!(&buf[..8], &1u64.to_be_bytes());
        assert_eq!(buf[8], b'A');
    }

    #[test]
    fn test_read_at_past_end_returns_zero() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("0.store")).unwrap();
        store.append(b"x").unwrap();

        let mut buf = [0u8; 16];
        let n = store.read_at(&mut buf, 100).unwrap();
        assert_eq!(n, 0);
    }
}
