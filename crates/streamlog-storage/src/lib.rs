//! streamlog storage engine
//!
//! A segmented, append-only commit log on local disk. Three layers, built
//! bottom-up:
//!
//! - [`store`]: one append-only file of length-prefixed frames
//! - [`index`]: a fixed-stride memory-mapped table from relative offset to
//!   frame position
//! - [`segment`]: one store plus one index covering a contiguous offset range
//! - [`log`]: the ordered segment sequence - roll, read routing, truncation,
//!   and whole-log streaming
//!
//! ## Quick Start
//!
//! ```ignore
//! use bytes::Bytes;
//! use streamlog_core::Record;
//! use streamlog_storage::{Log, LogConfig};
//!
//! let log = Log::open("./data/log", LogConfig::default())?;
//!
//! let mut record = Record::new(Bytes::from("hello world"));
//! let offset = log.append(&mut record)?;
//!
//! let read_back = log.read(offset)?;
//! assert_eq!(read_back.value, Bytes::from("hello world"));
//! ```
//!
//! ## Durability Model
//!
//! Appends are buffered; the index mapping is synced and the files flushed
//! on close. A crash between a store write and its index write leaves the
//! frame unreachable by offset but never corrupts the log: sizes are
//! recovered from on-disk file lengths at the next open. Group commit and
//! replication live above this crate.

pub mod config;
pub mod index;
pub mod log;
pub mod segment;
pub mod store;

pub use config::{LogConfig, SegmentConfig, DEFAULT_MAX_BYTES};
pub use log::{Log, LogReader};
pub use segment::Segment;
pub use store::Store;
