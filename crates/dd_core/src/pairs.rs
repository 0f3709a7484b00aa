//! Pairwise and cluster-level artifacts produced by Stages 2–6.
//!
//! Each type here is deliberately flat and side-table friendly: a
//! `CandidatePair`/`ScoredPair`/`PairDecision` carries its two `RecordId`s by
//! value rather than any reference, so Stage 3-6 artifacts can be sorted,
//! JSONL-serialized, and reloaded independently without resurrecting object
//! graphs.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::fields::FieldName;
use crate::ids::{ClusterId, RecordId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which blocking strategy produced a `CandidatePair`. A pair may
/// be (re-)discovered by more than one blocker; `CandidatePair::blockers`
/// collects every tag that proposed it.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BlockerTag {
    Doi,
    Pmid,
    YearTitle,
    Lsh,
}

impl BlockerTag {
    pub const fn as_str(self) -> &'static str {
        match self {
            BlockerTag::Doi => "doi",
            BlockerTag::Pmid => "pmid",
            BlockerTag::YearTitle => "year_title",
            BlockerTag::Lsh => "lsh",
        }
    }
}

/// An unordered pair of records proposed for comparison by one or more
/// blockers. `left`/`right` are always stored with `left < right`, enforced
/// at construction, so the pair sorts canonically by `(left, right)`.
#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CandidatePair {
    pub left: RecordId,
    pub right: RecordId,
    pub blockers: Vec<BlockerTag>,
}

impl CandidatePair {
    /// Construct with `left`/`right` ordered canonically. `blockers` should
    /// already be de-duplicated and sorted by the caller (blocking stage).
    pub fn new(a: RecordId, b: RecordId, blockers: Vec<BlockerTag>) -> Self {
        if a <= b {
            CandidatePair {
                left: a,
                right: b,
                blockers,
            }
        } else {
            CandidatePair {
                left: b,
                right: a,
                blockers,
            }
        }
    }
}

/// Per-field comparison outcome feeding Fellegi–Sunter aggregation.
/// `agreement` is quantized to `{0.0, 0.5, 1.0}`.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FieldAgreement {
    pub field: FieldName,
    pub agreement: f64,
    /// `true` when either side is missing this field — excluded from
    /// log-likelihood aggregation.
    pub missing: bool,
}

/// A `CandidatePair` with its Fellegi–Sunter score attached.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScoredPair {
    pub left: RecordId,
    pub right: RecordId,
    pub score: f64,
    /// Bit `i` set iff `FieldName::ALL[i]` was present on both sides and
    /// contributed to `score`.
    pub agreement_pattern: u16,
    pub field_agreements: Vec<FieldAgreement>,
}

/// Three-way decision outcome.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Decision {
    AutoMatch,
    Review,
    AutoNonMatch,
}

impl Decision {
    pub const fn as_str(self) -> &'static str {
        match self {
            Decision::AutoMatch => "auto_match",
            Decision::Review => "review",
            Decision::AutoNonMatch => "auto_non_match",
        }
    }
}

/// Why a `PairDecision` landed where it did, for audit without re-deriving
/// thresholds from `EngineConfig`.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DecisionReason {
    DoiExactShortCircuit,
    PmidExactShortCircuit,
    ScoreAboveHigh,
    ScoreBelowLow,
    ScoreBetweenThresholds,
}

impl DecisionReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            DecisionReason::DoiExactShortCircuit => "doi_exact_short_circuit",
            DecisionReason::PmidExactShortCircuit => "pmid_exact_short_circuit",
            DecisionReason::ScoreAboveHigh => "score_above_high",
            DecisionReason::ScoreBelowLow => "score_below_low",
            DecisionReason::ScoreBetweenThresholds => "score_between_thresholds",
        }
    }
}

/// A `ScoredPair` with its final decision. `short_circuited` is
/// set when a shared DOI/PMID forced `AutoMatch` independent of `score`.
/// `threshold_low`/`threshold_high` are the thresholds in effect for this
/// run, carried alongside the decision so a reader never has to re-resolve
/// `t_high` from the calibration to audit one pair.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PairDecision {
    pub left: RecordId,
    pub right: RecordId,
    pub score: f64,
    pub decision: Decision,
    pub threshold_low: f64,
    pub threshold_high: f64,
    pub reason: DecisionReason,
    pub short_circuited: bool,
}

/// A group of records resolved to the same bibliographic entity.
/// `id` is `ClusterId::from_min_member`, so `members[0] == id` once sorted.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cluster {
    pub id: ClusterId,
    /// Ascending `RecordId` order.
    pub members: Vec<RecordId>,
    /// Every `PairDecision` whose endpoints both fall within `members`,
    /// ascending `(left, right)`.
    pub edges: Vec<PairDecision>,
    /// The member Stage 6 will select as survivor; computed once here so
    /// Stage 6 never has to re-derive it independently of the cluster.
    pub survivor_id: RecordId,
    /// `true` iff the anti-transitivity guard removed at least one
    /// `AutoMatch` edge touching a member of this cluster while resolving
    /// a contradiction elsewhere in the run.
    pub anti_transitivity_split: bool,
}

/// The single surviving record for a cluster, with full per-field
/// provenance. Singleton clusters still produce a `MergedRecord` with
/// `sources.len() == 1`: every input record is traceable to exactly one
/// output, merged or singleton.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MergedRecord {
    pub cluster_id: ClusterId,
    pub record: crate::domain::CanonicalRecord,
    /// `RecordId`s absorbed into `record`, ascending, including the
    /// survivor itself.
    pub sources: Vec<RecordId>,
    /// Survivor's own id, for quick identification without scanning
    /// `sources`.
    pub survivor: RecordId,
    /// Which member contributed each non-null field's value. Fields
    /// outside the `FieldName` vocabulary (`abstract_text`, `type`) are not
    /// tracked here, matching `FieldName`'s own closed scope.
    pub provenance: BTreeMap<FieldName, RecordId>,
}
