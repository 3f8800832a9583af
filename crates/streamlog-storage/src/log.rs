//! Log - The Ordered Sequence of Segments
//!
//! The log owns every segment in its directory, routes reads to the segment
//! covering the requested offset, rolls a new active segment when the
//! current one fills, and supports prefix truncation plus a whole-log byte
//! stream for snapshot shipping.
//!
//! ## Startup
//!
//! Opening a log enumerates its directory and rebuilds the segment sequence
//! from file names. Base offsets are collected into a set (every base
//! appears twice, once per extension, and stray files are ignored), sorted
//! ascending, and opened in order; the last segment becomes the append
//! target. An empty directory gets one fresh segment at
//! `config.segment.initial_offset`.
//!
//! ## Roll Policy
//!
//! Rolling is eager: before an append touches the active segment, the log
//! checks `is_maxed()` and, if full, creates a segment based at
//! `highest + 1`. Rolling before the write rather than after a failed one
//! keeps every segment self-consistent; there is never a partial write to
//! roll back.
//!
//! ## Concurrency
//!
//! One readers-writer lock over the segment sequence. Appends, truncation,
//! reset, close, and removal take the write lock; reads, offset queries, and
//! reader creation take the read lock. Store-level flushing is serialized by
//! each store's own mutex, acquired strictly after the log lock.

use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use streamlog_core::{CommitLog, Error, Record, RecordCodec, Result, ValueCodec};

use crate::config::LogConfig;
use crate::segment::Segment;
use crate::store::{Store, LEN_WIDTH};

/// Append-only commit log over a directory of segments
pub struct Log {
    dir: PathBuf,
    config: LogConfig,
    codec: Arc<dyn RecordCodec>,
    segments: RwLock<Vec<Segment>>,
}

impl Log {
    /// Open or create a log in `dir` with the default value codec.
    pub fn open(dir: impl Into<PathBuf>, config: LogConfig) -> Result<Self> {
        Self::with_codec(dir, config, Arc::new(ValueCodec))
    }

    /// Open or create a log with a caller-supplied record codec.
    pub fn with_codec(
        dir: impl Into<PathBuf>,
        config: LogConfig,
        codec: Arc<dyn RecordCodec>,
    ) -> Result<Self> {
        let dir = dir.into();
        let config = config.normalized();

        // A store threshold at or below the length prefix can never hold one
        // frame, so no first append could ever be accepted.
        if config.segment.max_store_bytes <= LEN_WIDTH {
            return Err(Error::InvalidConfig(format!(
                "max_store_bytes must exceed the {LEN_WIDTH}-byte frame header, got {}",
                config.segment.max_store_bytes
            )));
        }

        fs::create_dir_all(&dir)?;

        let segments = Self::setup(&dir, &config, &codec)?;
        info!(
            dir = %dir.display(),
            segments = segments.len(),
            lowest = segments.first().map(Segment::base_offset).unwrap_or(0),
            next = segments.last().map(Segment::next_offset).unwrap_or(0),
            "log opened"
        );

        Ok(Self {
            dir,
            config,
            codec,
            segments: RwLock::new(segments),
        })
    }

    /// Rebuild the segment sequence from the directory contents.
    fn setup(
        dir: &Path,
        config: &LogConfig,
        codec: &Arc<dyn RecordCodec>,
    ) -> Result<Vec<Segment>> {
        // Each base offset names two files; the set collapses the pair and
        // skips anything that is not a segment file.
        let mut bases = BTreeSet::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            if let Ok(base) = stem.parse::<u64>() {
                bases.insert(base);
            }
        }

        let mut segments = Vec::with_capacity(bases.len().max(1));
        for base in bases {
            segments.push(Segment::open(dir, base, config.segment, Arc::clone(codec))?);
        }
        if segments.is_empty() {
            segments.push(Segment::open(
                dir,
                config.segment.initial_offset,
                config.segment,
                Arc::clone(codec),
            )?);
        }
        Ok(segments)
    }

    /// Append a record to the active segment, rolling first if it is full.
    ///
    /// Returns the assigned offset, which is also stamped onto `record`.
    pub fn append(&self, record: &mut Record) -> Result<u64> {
        let mut segments = self.segments.write();

        let highest = Self::highest_locked(&segments)?;
        let maxed = segments.last().map(Segment::is_maxed).unwrap_or(false);
        if maxed {
            let base = highest + 1;
            info!(base_offset = base, "rolling new segment");
            segments.push(Segment::open(
                &self.dir,
                base,
                self.config.segment,
                Arc::clone(&self.codec),
            )?);
        }

        let active = segments.last_mut().ok_or(Error::Closed)?;
        active.append(record)
    }

    /// Read the record at `offset` from whichever segment covers it.
    pub fn read(&self, offset: u64) -> Result<Record> {
        let segments = self.segments.read();
        let segment = segments
            .iter()
            .find(|segment| segment.contains(offset))
            .ok_or(Error::OffsetOutOfRange(offset))?;
        segment.read(offset)
    }

    /// Base offset of the oldest surviving segment.
    pub fn lowest_offset(&self) -> Result<u64> {
        let segments = self.segments.read();
        let first = segments.first().ok_or(Error::Closed)?;
        Ok(first.base_offset())
    }

    /// Offset of the most recently appended record, or zero on a fresh log.
    pub fn highest_offset(&self) -> Result<u64> {
        Self::highest_locked(&self.segments.read())
    }

    fn highest_locked(segments: &[Segment]) -> Result<u64> {
        let last = segments.last().ok_or(Error::Closed)?;
        let next = last.next_offset();
        Ok(if next == 0 { 0 } else { next - 1 })
    }

    /// Remove every segment whose entire offset range is `<= lowest`.
    ///
    /// If truncation would leave no segments, a fresh active segment is
    /// created at `lowest + 1` so the next append needs no special case.
    pub fn truncate(&self, lowest: u64) -> Result<()> {
        let mut segments = self.segments.write();

        let mut removed = 0usize;
        for segment in std::mem::take(&mut *segments) {
            if segment.next_offset() <= lowest + 1 {
                segment.remove()?;
                removed += 1;
            } else {
                segments.push(segment);
            }
        }

        if segments.is_empty() {
            segments.push(Segment::open(
                &self.dir,
                lowest + 1,
                self.config.segment,
                Arc::clone(&self.codec),
            )?);
        }

        info!(lowest, removed, "truncated log");
        Ok(())
    }

    /// Delete every segment and recreate one fresh segment at the
    /// configured initial offset.
    pub fn reset(&self) -> Result<()> {
        let mut segments = self.segments.write();
        for segment in segments.drain(..) {
            segment.remove()?;
        }
        *segments = Self::setup(&self.dir, &self.config, &self.codec)?;

        info!(dir = %self.dir.display(), "log reset");
        Ok(())
    }

    /// Close every segment in order.
    ///
    /// Further operations on this log fail with `Closed`.
    pub fn close(&self) -> Result<()> {
        let mut segments = self.segments.write();
        for segment in segments.drain(..) {
            segment.close()?;
        }

        debug!(dir = %self.dir.display(), "log closed");
        Ok(())
    }

    /// Close the log and delete its directory.
    pub fn remove(&self) -> Result<()> {
        self.close()?;
        fs::remove_dir_all(&self.dir)?;
        Ok(())
    }

    /// Byte stream over every store in segment order, framing included.
    ///
    /// The reader captures each store handle and its size under the read
    /// lock, so draining after this call returns is a consistent snapshot:
    /// appends that land later extend the files past the captured sizes and
    /// are never observed.
    pub fn reader(&self) -> LogReader {
        let segments = self.segments.read();
        let sources = segments
            .iter()
            .map(|segment| StoreSource {
                store: segment.store(),
                len: segment.store_size(),
                position: 0,
            })
            .collect();
        LogReader {
            sources,
            current: 0,
        }
    }
}

impl CommitLog for Log {
    fn append(&self, record: &mut Record) -> Result<u64> {
        Log::append(self, record)
    }

    fn read(&self, offset: u64) -> Result<Record> {
        Log::read(self, offset)
    }
}

struct StoreSource {
    store: Arc<Store>,
    /// Store size at snapshot time; bytes past this are never read
    len: u64,
    position: u64,
}

/// Sequential reader over the raw bytes of every store, in segment order
pub struct LogReader {
    sources: Vec<StoreSource>,
    current: usize,
}

impl Read for LogReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while let Some(source) = self.sources.get_mut(self.current) {
            let remaining = source.len - source.position;
            if remaining == 0 {
                self.current += 1;
                continue;
            }

            let want = (buf.len() as u64).min(remaining) as usize;
            let n = source
                .store
                .read_at(&mut buf[..want], source.position)
                .map_err(into_io_error)?;
            if n == 0 {
                self.current += 1;
                continue;
            }

            source.position += n as u64;
            return Ok(n);
        }
        Ok(0)
    }
}

fn into_io_error(err: Error) -> io::Error {
    match err {
        Error::Io(io) => io,
        other => io::Error::new(io::ErrorKind::Other, other),
    }
}
