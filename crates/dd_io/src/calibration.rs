//! Fellegi–Sunter calibration tables: per-field `m`/`u` probabilities and the
//! empirical non-match score distribution `F_u` used to derive `t_high` from
//! a target false-positive rate.
//!
//! A default calibration is shipped with the crate (`resources/calibration.json`,
//! embedded via `include_str!`) so the engine runs out of the box; callers may
//! instead load a site-specific calibration from disk with
//! [`Calibration::from_path`].

use std::collections::BTreeMap;
use std::path::Path;

use dd_core::fields::FieldName;
use serde::{Deserialize, Serialize};

use crate::IoError;

const DEFAULT_CALIBRATION_JSON: &str = include_str!("../resources/calibration.json");

#[derive(Clone, Debug, Serialize, Deserialize)]
struct CalibrationWire {
    m: BTreeMap<String, f64>,
    u: BTreeMap<String, f64>,
    /// Ascending-sorted sample of Fellegi–Sunter scores for known non-matches.
    f_u: Vec<f64>,
    /// Declared quantile convention for `Calibration::t_high`. Only
    /// `"linear"` is currently implemented (R type-7 linear interpolation —
    /// see DESIGN.md).
    quantile_method: String,
}

/// Loaded, validated calibration tables for one engine run.
#[derive(Clone, Debug)]
pub struct Calibration {
    m: BTreeMap<FieldName, f64>,
    u: BTreeMap<FieldName, f64>,
    f_u: Vec<f64>,
    quantile_method: String,
}

impl Calibration {
    /// The calibration embedded in the binary at compile time.
    pub fn default_embedded() -> Result<Self, IoError> {
        Self::from_wire(serde_json::from_str(DEFAULT_CALIBRATION_JSON)?)
    }

    /// Load and validate a calibration file from disk.
    pub fn from_path(path: &Path) -> Result<Self, IoError> {
        let text = std::fs::read_to_string(path)?;
        let wire: CalibrationWire = serde_json::from_str(&text)?;
        Self::from_wire(wire)
    }

    fn from_wire(wire: CalibrationWire) -> Result<Self, IoError> {
        if wire.quantile_method != "linear" {
            return Err(IoError::Calibration(format!(
                "unsupported quantile_method: {}",
                wire.quantile_method
            )));
        }
        if wire.f_u.is_empty() {
            return Err(IoError::Calibration("f_u must be non-empty".into()));
        }
        let mut f_u = wire.f_u;
        f_u.sort_by(|a, b| a.partial_cmp(b).expect("calibration score is NaN"));

        let mut m = BTreeMap::new();
        let mut u = BTreeMap::new();
        for field in FieldName::ALL {
            let key = field.as_str();
            let m_f = *wire
                .m
                .get(key)
                .ok_or_else(|| IoError::Calibration(format!("missing m[{key}]")))?;
            let u_f = *wire
                .u
                .get(key)
                .ok_or_else(|| IoError::Calibration(format!("missing u[{key}]")))?;
            if !(0.0..=1.0).contains(&m_f) || !(0.0..=1.0).contains(&u_f) {
                return Err(IoError::Calibration(format!(
                    "m/u for {key} must be in [0,1], got m={m_f} u={u_f}"
                )));
            }
            m.insert(field, m_f);
            u.insert(field, u_f);
        }

        Ok(Calibration {
            m,
            u,
            f_u,
            quantile_method: wire.quantile_method,
        })
    }

    pub fn m_weight(&self, field: FieldName) -> f64 {
        self.m[&field]
    }

    pub fn u_weight(&self, field: FieldName) -> f64 {
        self.u[&field]
    }

    pub fn quantile_method(&self) -> &str {
        &self.quantile_method
    }

    /// Derive `t_high` such that approximately `fpr_alpha` fraction of
    /// non-match scores fall at or above it — the `(1 - fpr_alpha)`
    /// quantile of `F_u`, via linear interpolation between order statistics
    /// (see DESIGN.md for why linear interpolation was chosen).
    ///
    /// `fpr_alpha` must be in `(0.0, 0.5]` (checked by
    /// `EngineConfig::validate` before this is ever called).
    pub fn t_high_for_fpr(&self, fpr_alpha: f64) -> f64 {
        let q = 1.0 - fpr_alpha;
        quantile_linear(&self.f_u, q)
    }
}

/// Linear-interpolation quantile over an ascending-sorted slice (the `R`
/// type-7 convention): `q` in `[0, 1]`.
fn quantile_linear(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    if sorted.len() == 1 {
        return sorted[0];
    }
    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = pos - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_embedded_calibration_loads_and_validates() {
        let cal = Calibration::default_embedded().unwrap();
        assert_eq!(cal.quantile_method(), "linear");
        for field in FieldName::ALL {
            assert!(cal.m_weight(field) > cal.u_weight(field));
        }
    }

    #[test]
    fn quantile_linear_matches_known_values() {
        let v = vec![1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile_linear(&v, 0.0), 1.0);
        assert_eq!(quantile_linear(&v, 1.0), 4.0);
        assert_eq!(quantile_linear(&v, 0.5), 2.5);
    }

    #[test]
    fn t_high_increases_as_fpr_alpha_shrinks() {
        let cal = Calibration::default_embedded().unwrap();
        let strict = cal.t_high_for_fpr(0.001);
        let loose = cal.t_high_for_fpr(0.1);
        assert!(strict >= loose);
    }

    #[test]
    fn rejects_non_linear_quantile_method() {
        let wire = CalibrationWire {
            m: FieldName::ALL.iter().map(|f| (f.as_str().to_string(), 0.9)).collect(),
            u: FieldName::ALL.iter().map(|f| (f.as_str().to_string(), 0.1)).collect(),
            f_u: vec![0.1, 0.2],
            quantile_method: "nearest".into(),
        };
        assert!(Calibration::from_wire(wire).is_err());
    }
}
