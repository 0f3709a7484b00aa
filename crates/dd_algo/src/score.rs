//! Stage 3 (part 2): Fellegi–Sunter log-likelihood aggregation.
//!
//! Each present field contributes `agreement * ln(m_f/u_f) + (1-agreement)
//! * ln((1-m_f)/(1-u_f))` to the total log-likelihood ratio; a missing
//! field contributes `config.missing_weight` instead of being read from the
//! calibration. The ratio is squashed through a logistic function so the
//! final `score` lands in `(0.0, 1.0)`, comparable against `t_low`/`t_high`.

use dd_core::config::EngineConfig;
use dd_core::domain::CanonicalRecord;
use dd_core::fields::FieldName;
use dd_core::pairs::ScoredPair;
use dd_io::calibration::Calibration;

use crate::compare::compare_fields;

pub fn score_pair(
    calibration: &Calibration,
    config: &EngineConfig,
    a: &CanonicalRecord,
    b: &CanonicalRecord,
) -> ScoredPair {
    let field_agreements = compare_fields(a, b);

    let mut llr = 0.0f64;
    let mut agreement_pattern: u16 = 0;
    for fa in &field_agreements {
        if fa.missing {
            llr += config.missing_weight;
            continue;
        }
        agreement_pattern |= fa.field.bit();
        llr += field_weight(calibration, fa.field, fa.agreement);
    }

    let score = logistic(llr);

    let (left, right) = if a.id <= b.id {
        (a.id.clone(), b.id.clone())
    } else {
        (b.id.clone(), a.id.clone())
    };

    ScoredPair {
        left,
        right,
        score,
        agreement_pattern,
        field_agreements,
    }
}

/// Linear interpolation between the full-disagreement and full-agreement
/// log-likelihood weights for a quantized agreement level in `{0, 0.5, 1}`.
fn field_weight(calibration: &Calibration, field: FieldName, agreement: f64) -> f64 {
    let m = calibration.m_weight(field);
    let u = calibration.u_weight(field);
    let agree_weight = (m / u).ln();
    let disagree_weight = ((1.0 - m) / (1.0 - u)).ln();
    agreement * agree_weight + (1.0 - agreement) * disagree_weight
}

fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
