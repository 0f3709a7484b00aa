//! Stage 3 orchestration: score every candidate pair against the shipped
//! calibration, sort, and write the `stage3/scored_pairs.jsonl` artifact.

use std::collections::BTreeMap;
use std::path::Path;

use dd_core::config::EngineConfig;
use dd_core::determinism::sort_canonical;
use dd_core::domain::CanonicalRecord;
use dd_core::error::EngineResult;
use dd_core::ids::RecordId;
use dd_core::pairs::{CandidatePair, ScoredPair};
use dd_io::calibration::Calibration;
use dd_io::jsonl::write_jsonl_atomic;

pub const NAME: &str = "scored_pairs";
pub const REL_PATH: &str = "stage3/scored_pairs.jsonl";

pub fn run(
    out_dir: &Path,
    calibration: &Calibration,
    config: &EngineConfig,
    records_by_id: &BTreeMap<RecordId, CanonicalRecord>,
    candidates: &[CandidatePair],
) -> EngineResult<Vec<ScoredPair>> {
    let mut scored: Vec<ScoredPair> = candidates
        .iter()
        .map(|pair| {
            dd_algo::score_pair(
                calibration,
                config,
                &records_by_id[&pair.left],
                &records_by_id[&pair.right],
            )
        })
        .collect();
    sort_canonical(&mut scored);
    write_jsonl_atomic(&out_dir.join(REL_PATH), &scored)?;
    Ok(scored)
}
