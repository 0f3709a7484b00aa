//! Stage 4 orchestration: resolve `t_high` once per run, decide every
//! scored pair, sort, and write the `stage4/pair_decisions.jsonl` artifact.

use std::path::Path;

use dd_core::config::EngineConfig;
use dd_core::determinism::sort_canonical;
use dd_core::error::EngineResult;
use dd_core::pairs::{PairDecision, ScoredPair};
use dd_io::calibration::Calibration;
use dd_io::jsonl::write_jsonl_atomic;

pub const NAME: &str = "pair_decisions";
pub const REL_PATH: &str = "stage4/pair_decisions.jsonl";

pub fn run(
    out_dir: &Path,
    calibration: &Calibration,
    config: &EngineConfig,
    scored: &[ScoredPair],
) -> EngineResult<(f64, Vec<PairDecision>)> {
    let t_high = dd_algo::resolve_t_high(calibration, config);
    let mut decisions: Vec<PairDecision> = scored
        .iter()
        .map(|pair| dd_algo::decide_pair(config, t_high, pair))
        .collect();
    sort_canonical(&mut decisions);
    write_jsonl_atomic(&out_dir.join(REL_PATH), &decisions)?;
    Ok((t_high, decisions))
}
