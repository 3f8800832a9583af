//! Error Types for streamlog
//!
//! This module defines all error types that can occur in streamlog operations.
//!
//! ## Error Categories
//!
//! ### I/O Errors
//! - File reads/writes, flush, fsync, truncation, and memory mapping all
//!   surface here via the `Io` variant.
//!
//! ### Index Errors
//! - `IndexFull`: the mapped index region has no room for another entry.
//!   The log treats this as a roll trigger; callers normally never see it.
//! - `EndOfIndex`: a read past the last written index entry. The segment and
//!   log translate this into `OffsetOutOfRange` before it reaches callers.
//!
//! ### Query Errors
//! - `OffsetOutOfRange`: the requested offset was never assigned or has been
//!   truncated away.
//!
//! ### Codec Errors
//! - `Codec`: record bytes could not be produced or parsed.
//!
//! ### Config Errors
//! - `InvalidConfig`: the log configuration was rejected at open, e.g. a
//!   store threshold too small to ever hold one frame.
//!
//! ## Usage
//! All fallible functions return `Result<T>` which is aliased to
//! `Result<T, Error>`. This allows clean error propagation with `?`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("index is full")]
    IndexFull,

    #[error("read past end of index")]
    EndOfIndex,

    #[error("offset out of range: {0}")]
    OffsetOutOfRange(u64),

    #[error("codec error: {0}")]
    Codec(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("log is closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_converts() {
        fn read_missing() -> Result<Vec<u8>> {
            let data = std::fs::read("/definitely/not/a/real/path")?;
            Ok(data)
        }
        let err = read_missing().unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_offset_out_of_range_display() {
        let err = Error::OffsetOutOfRange(42);
        assert_eq!(format!("{}", err), "offset out of range: 42");
    }

    #[test]
    fn test_index_full_display() {
        assert_eq!(format!("{}", Error::IndexFull), "index is full");
    }

    #[test]
    fn test_codec_display_includes_detail() {
        let err = Error::Codec("frame too short: 3 bytes".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("frame too short"));
    }

    #[test]
    fn test_invalid_config_display_includes_detail() {
        let err = Error::InvalidConfig("max_store_bytes too small: 5".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("invalid config"));
        assert!(msg.contains("max_store_bytes"));
    }
}
