//! Unified error types.
//!
//! `CoreError` covers parsing/validation failures inside this I/O-free
//! crate (mirrors the shape of newtype validation errors elsewhere in the
//! workspace). `EngineError` is the single error type propagated across
//! crate boundaries (`dd_io`, `dd_algo`, `dd_pipeline`, `dd_cli`), with one
//! variant per failure class a run can hit.

use core::fmt;

/// Minimal error set for core-domain validation & parsing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CoreError {
    InvalidId,
    InvalidFieldName,
    DomainOutOfRange(&'static str),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::InvalidId => write!(f, "invalid id"),
            CoreError::InvalidFieldName => write!(f, "invalid field name"),
            CoreError::DomainOutOfRange(k) => write!(f, "domain out of range: {k}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CoreError {}

/// The engine's single error type.
///
/// - `Configuration` — invalid thresholds, blocker names, or LSH parameters.
/// - `Calibration` — missing/corrupt shipped calibration tables.
/// - `Input` — malformed `RawRecord` lacking both `id` and source identifier.
/// - `Io` — artifact write failure.
#[cfg(feature = "std")]
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Configuration(alloc::string::String),

    #[error("calibration error: {0}")]
    Calibration(alloc::string::String),

    #[error("input error: {0}")]
    Input(alloc::string::String),

    #[error("io error: {0}")]
    Io(alloc::string::String),
}

#[cfg(feature = "std")]
impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        EngineError::Io(e.to_string())
    }
}

#[cfg(feature = "std")]
pub type EngineResult<T> = Result<T, EngineError>;
