//! Core types shared across streamlog components
//!
//! This crate holds the pieces every other streamlog crate agrees on:
//!
//! - [`Record`]: the unit of data flowing through the log
//! - [`RecordCodec`]: the serialization contract between the request layer
//!   and the storage engine
//! - [`CommitLog`]: the narrow capability the request layer consumes
//! - [`Error`]/[`Result`]: the shared error taxonomy

pub mod codec;
pub mod error;
pub mod record;

pub use codec::{RecordCodec, ValueCodec};
pub use error::{Error, Result};
pub use record::Record;

/// A thing that can append and read records.
///
/// The request layer depends on this contract rather than on a concrete log
/// implementation, so tests can substitute an in-memory stand-in.
pub trait CommitLog: Send + Sync {
    /// Append a record, stamping and returning its assigned offset.
    fn append(&self, record: &mut Record) -> Result<u64>;

    /// Read the record stored at `offset`.
    fn read(&self, offset: u64) -> Result<Record>;
}
