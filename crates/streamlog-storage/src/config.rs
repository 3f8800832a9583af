//! Storage Configuration
//!
//! This module defines configuration for the segmented log.
//!
//! ## SegmentConfig
//!
//! Controls when the active segment rolls and where a fresh log starts:
//!
//! - **max_store_bytes**: roll threshold on the store file size (default: 1024)
//! - **max_index_bytes**: roll threshold on the index file size; also the
//!   size the index file is pre-extended to while open (default: 1024)
//! - **initial_offset**: base offset of the very first segment on a fresh
//!   log (default: 0)
//!
//! A zero supplied for either byte threshold means "use the default"; the
//! log normalizes the config when it opens.
//!
//! ## Usage
//!
//! ```ignore
//! use streamlog_storage::{LogConfig, SegmentConfig};
//!
//! // Small segments for fast roll in tests
//! let config = LogConfig {
//!     segment: SegmentConfig {
//!         max_store_bytes: 32,
//!         ..Default::default()
//!     },
//! };
//! ```

use serde::{Deserialize, Serialize};

/// Default roll threshold for both the store and the index, in bytes
pub const DEFAULT_MAX_BYTES: u64 = 1024;

/// Per-segment thresholds and the initial base offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentConfig {
    /// Maximum store file size in bytes before rolling (default: 1024)
    #[serde(default = "default_max_bytes")]
    pub max_store_bytes: u64,

    /// Maximum index file size in bytes before rolling; the index file is
    /// pre-extended to this size while open (default: 1024)
    #[serde(default = "default_max_bytes")]
    pub max_index_bytes: u64,

    /// Base offset assigned to the first segment of a fresh log (default: 0)
    #[serde(default)]
    pub initial_offset: u64,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            max_store_bytes: default_max_bytes(),
            max_index_bytes: default_max_bytes(),
            initial_offset: 0,
        }
    }
}

/// Configuration for a [`crate::Log`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub segment: SegmentConfig,
}

impl LogConfig {
    /// Replace zero thresholds with their defaults.
    ///
    /// Callers may leave `max_store_bytes`/`max_index_bytes` at zero to mean
    /// "default"; the log normalizes once at open so every later comparison
    /// sees real thresholds.
    pub(crate) fn normalized(mut self) -> Self {
        if self.segment.max_store_bytes == 0 {
            self.segment.max_store_bytes = DEFAULT_MAX_BYTES;
        }
        if self.segment.max_index_bytes == 0 {
            self.segment.max_index_bytes = DEFAULT_MAX_BYTES;
        }
        self
    }
}

fn default_max_bytes() -> u64 {
    DEFAULT_MAX_BYTES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SegmentConfig::default();
        assert_eq!(config.max_store_bytes, 1024);
        assert_eq!(config.max_index_bytes, 1024);
        assert_eq!(config.initial_offset, 0);
    }

    #[test]
    fn test_normalized_fills_zero_thresholds() {
        let config = LogConfig {
            segment: SegmentConfig {
                max_store_bytes: 0,
                max_index_bytes: 0,
                initial_offset: 5,
            },
        };
        let normalized = config.normalized();
        assert_eq!(normalized.segment.max_store_bytes, DEFAULT_MAX_BYTES);
        assert_eq!(normalized.segment.max_index_bytes, DEFAULT_MAX_BYTES);
        assert_eq!(normalized.segment.initial_offset, 5);
    }

    #[test]
    fn test_normalized_keeps_explicit_thresholds() {
        let config = LogConfig {
            segment: SegmentConfig {
                max_store_bytes: 32,
                max_index_bytes: 64,
                initial_offset: 0,
            },
        };
        let normalized = config.normalized();
        assert_eq!(normalized.segment.max_store_bytes, 32);
        assert_eq!(normalized.segment.max_index_bytes, 64);
    }

    #[test]
    fn test_deserialize_empty_uses_defaults() {
        let config: LogConfig = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(config.segment, SegmentConfig::default());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: LogConfig =
            serde_json::from_str(r#"{"segment":{"max_store_bytes":32}}"#).expect("deserialize");
        assert_eq!(config.segment.max_store_bytes, 32);
        assert_eq!(config.segment.max_index_bytes, 1024);
        assert_eq!(config.segment.initial_offset, 0);
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = LogConfig {
            segment: SegmentConfig {
                max_store_bytes: 2048,
                max_index_bytes: 4096,
                initial_offset: 100,
            },
        };
        let json = serde_json::to_string(&config).expect("serialize");
        let deserialized: LogConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(config, deserialized);
    }
}
