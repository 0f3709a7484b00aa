//! Stage 4: three-way decisioning with an FPR-budgeted `t_high` and a
//! DOI/PMID short-circuit.
//!
//! - `score >= t_high` → `AutoMatch`
//! - `score < t_low` → `AutoNonMatch`
//! - otherwise → `Review`
//! - a pair sharing a non-null, exactly-equal DOI or PMID is forced to
//!   `AutoMatch` regardless of `score` (`short_circuited = true`); this is
//!   checked first so a low aggregate score from noisy peripheral fields
//!   never overrides a confirmed identifier match.

use dd_core::config::EngineConfig;
use dd_core::fields::FieldName;
use dd_core::pairs::{Decision, DecisionReason, PairDecision, ScoredPair};
use dd_io::calibration::Calibration;

/// Resolve `t_high`: an explicit config override, else the calibration's
/// FPR-budgeted quantile of the non-match score distribution.
pub fn resolve_t_high(calibration: &Calibration, config: &EngineConfig) -> f64 {
    config
        .t_high_override
        .unwrap_or_else(|| calibration.t_high_for_fpr(config.fpr_alpha))
}

pub fn decide_pair(config: &EngineConfig, t_high: f64, scored: &ScoredPair) -> PairDecision {
    let identifier_match = identifier_short_circuit(scored);

    let (decision, reason, short_circuited) = if let Some(reason) = identifier_match {
        (Decision::AutoMatch, reason, true)
    } else if scored.score >= t_high {
        (Decision::AutoMatch, DecisionReason::ScoreAboveHigh, false)
    } else if scored.score < config.t_low {
        (Decision::AutoNonMatch, DecisionReason::ScoreBelowLow, false)
    } else {
        (Decision::Review, DecisionReason::ScoreBetweenThresholds, false)
    };

    PairDecision {
        left: scored.left.clone(),
        right: scored.right.clone(),
        score: scored.score,
        decision,
        threshold_low: config.t_low,
        threshold_high: t_high,
        reason,
        short_circuited,
    }
}

/// DOI is checked before PMID: a pair with both an exact DOI and an exact
/// PMID match is reported under the stronger, more specific identifier.
fn identifier_short_circuit(scored: &ScoredPair) -> Option<DecisionReason> {
    let exact = |field: FieldName| {
        scored
            .field_agreements
            .iter()
            .any(|fa| fa.field == field && !fa.missing && fa.agreement == 1.0)
    };
    if exact(FieldName::Doi) {
        Some(DecisionReason::DoiExactShortCircuit)
    } else if exact(FieldName::Pmid) {
        Some(DecisionReason::PmidExactShortCircuit)
    } else {
        None
    }
}
