//! dd_io — canonical JSON/JSONL artifact I/O, SHA-256 hashing, and
//! calibration table loading for the bibliographic deduplication engine.
//!
//! - No inline implementations in this file: it re-exports the file
//!   modules to avoid drift.
//! - Shared error type (`IoError`) with `From` conversions used across
//!   modules.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Unified error for dd_io (used by canonical_json/jsonl/hasher/calibration).
#[derive(Debug, Error)]
pub enum IoError {
    #[error("io/path error: {0}")]
    Path(String),

    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    #[error("hash error: {0}")]
    Hash(String),

    #[error("calibration error: {0}")]
    Calibration(String),

    #[error("invalid: {0}")]
    Invalid(String),
}

pub type IoResult<T> = Result<T, IoError>;

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        IoError::Json {
            pointer: "/".to_string(),
            msg: e.to_string(),
        }
    }
}

impl From<IoError> for dd_core::error::EngineError {
    fn from(e: IoError) -> Self {
        match e {
            IoError::Calibration(m) => dd_core::error::EngineError::Calibration(m),
            other => dd_core::error::EngineError::Io(other.to_string()),
        }
    }
}

pub mod calibration;
pub mod canonical_json;
pub mod hasher;
pub mod jsonl;

pub mod prelude {
    pub use crate::{IoError, IoResult};

    pub use crate::calibration;
    pub use crate::canonical_json;
    pub use crate::hasher;
    pub use crate::jsonl;

    pub use crate::calibration::Calibration;
    pub use crate::canonical_json::to_canonical_json_bytes;
    #[cfg(feature = "hash")]
    pub use crate::hasher::sha256_hex;
    pub use crate::jsonl::{read_jsonl, write_jsonl_atomic};
}
