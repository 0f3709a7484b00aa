//! dd_core — Domain types, field/config domains, deterministic ordering, and
//! the unified error type for the bibliographic deduplication engine.
//!
//! This crate is **I/O-free**. It defines the stable types shared by
//! `dd_io`, `dd_algo`, `dd_pipeline`, and `dd_cli`:
//!
//! - Record lifecycle types: `RawRecord`, `CanonicalRecord`, `CandidatePair`,
//!   `ScoredPair`, `PairDecision`, `Cluster`, `MergedRecord`
//! - `FieldName`: the closed field enumeration used by Fellegi–Sunter scoring
//! - `EngineConfig`: the single immutable configuration value threaded
//!   through every stage entry point
//! - Deterministic ordering helpers: every stage artifact is sorted before write
//! - `EngineError`: the one error type used end-to-end
//!
//! Serialization derives are gated behind the `serde` feature.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod config;
pub mod determinism;
pub mod domain;
pub mod error;
pub mod fields;
pub mod ids;
pub mod pairs;

pub mod prelude {
    pub use crate::config::{BlockerKind, EngineConfig, LshParams};
    pub use crate::domain::{Author, CanonicalRecord, RawRecord, RecordType};
    pub use crate::error::{EngineError, EngineResult};
    pub use crate::fields::FieldName;
    pub use crate::ids::{ClusterId, RecordId};
    pub use crate::pairs::{
        BlockerTag, CandidatePair, Cluster, Decision, MergedRecord, PairDecision, ScoredPair,
    };
}
