//! `EngineConfig` — the single immutable configuration value threaded
//! through every stage entry point.
//!
//! Every field is named directly and validated as a unit by
//! `EngineConfig::validate`, which is the one place a malformed run is
//! rejected before Stage 1 ever runs.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::error::CoreError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which blocking strategies are active for a run. `Doi` and
/// `Pmid` are exact-match blockers; `YearTitle` buckets by `(year, title
/// prefix)`; `Lsh` is the MinHash/LSH near-duplicate blocker.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BlockerKind {
    Doi,
    Pmid,
    YearTitle,
    Lsh,
}

impl BlockerKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            BlockerKind::Doi => "doi",
            BlockerKind::Pmid => "pmid",
            BlockerKind::YearTitle => "year_title",
            BlockerKind::Lsh => "lsh",
        }
    }
}

/// MinHash/LSH blocking parameters: `bands * rows_per_band` must
/// equal the permutation count `num_hashes`.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LshParams {
    /// Character shingle length (default: 5).
    pub shingle_len: usize,
    /// Number of MinHash permutations, `H` (default: 128).
    pub num_hashes: usize,
    /// Number of LSH bands, `b` (default: 16).
    pub bands: usize,
    /// Rows per band, `r`, with `bands * rows_per_band == num_hashes`
    /// (default: 8).
    pub rows_per_band: usize,
    /// Fixed seed for deterministic per-hash coefficient generation
    /// (default: `0x5EED`).
    pub seed: u64,
}

impl Default for LshParams {
    fn default() -> Self {
        LshParams {
            shingle_len: 5,
            num_hashes: 128,
            bands: 16,
            rows_per_band: 8,
            seed: 0x5EED,
        }
    }
}

impl LshParams {
    fn validate(&self) -> Result<(), CoreError> {
        if self.shingle_len == 0 {
            return Err(CoreError::DomainOutOfRange("lsh.shingle_len"));
        }
        if self.num_hashes == 0 || self.bands == 0 || self.rows_per_band == 0 {
            return Err(CoreError::DomainOutOfRange("lsh.num_hashes/bands/rows_per_band"));
        }
        if self.bands * self.rows_per_band != self.num_hashes {
            return Err(CoreError::DomainOutOfRange(
                "lsh.bands * lsh.rows_per_band != lsh.num_hashes",
            ));
        }
        Ok(())
    }
}

/// The single immutable configuration value threaded through every stage.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Target false-positive rate budget used to derive `t_high` from the
    /// calibration's non-match score distribution.
    pub fpr_alpha: f64,
    /// Score at/above which a pair decided `Review` is instead demoted to
    /// `AutoNonMatch`'s floor; below `t_low` a pair is always
    /// `AutoNonMatch`.
    pub t_low: f64,
    /// Explicit `t_high` override. When `None`, `t_high` is derived from
    /// `fpr_alpha` and the shipped calibration.
    pub t_high_override: Option<f64>,
    /// Active blocking strategies, in the order they are applied. Must be
    /// non-empty.
    pub candidate_blockers: Vec<BlockerKind>,
    pub lsh: LshParams,
    /// Hard cap on candidate pairs generated per record across all
    /// blockers.
    pub max_pairs_per_record: usize,
    /// Per-field weight substituted into Fellegi-Sunter aggregation when a
    /// field is missing on either side; real in `[0, 1]`.
    pub missing_weight: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            fpr_alpha: 0.01,
            t_low: 0.3,
            t_high_override: None,
            candidate_blockers: alloc::vec![
                BlockerKind::Doi,
                BlockerKind::Pmid,
                BlockerKind::YearTitle,
                BlockerKind::Lsh,
            ],
            lsh: LshParams::default(),
            max_pairs_per_record: 200,
            missing_weight: 0.5,
        }
    }
}

impl EngineConfig {
    /// Validate the configuration as a unit. Called once, before Stage 1
    /// runs.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=0.5).contains(&self.fpr_alpha) || self.fpr_alpha == 0.0 {
            return Err(format!(
                "fpr_alpha must be in (0.0, 0.5], got {}",
                self.fpr_alpha
            ));
        }
        if self.t_low.is_nan() || self.t_low < 0.0 {
            return Err(format!("t_low must be in [0.0, inf), got {}", self.t_low));
        }
        if let Some(t_high) = self.t_high_override {
            if t_high.is_nan() || t_high < 0.0 {
                return Err(format!(
                    "t_high_override must be in [0.0, inf), got {t_high}"
                ));
            }
            if t_high < self.t_low {
                return Err(format!(
                    "t_high_override ({t_high}) must be >= t_low ({})",
                    self.t_low
                ));
            }
        }
        if !(0.0..=1.0).contains(&self.missing_weight) {
            return Err(format!(
                "missing_weight must be in [0.0, 1.0], got {}",
                self.missing_weight
            ));
        }
        if self.candidate_blockers.is_empty() {
            return Err("candidate_blockers must be non-empty".into());
        }
        if self.max_pairs_per_record == 0 {
            return Err("max_pairs_per_record must be > 0".into());
        }
        self.lsh
            .validate()
            .map_err(|e| format!("invalid lsh params: {e}"))?;
        Ok(())
    }
}
