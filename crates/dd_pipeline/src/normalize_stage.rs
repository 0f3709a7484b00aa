//! Stage 1 orchestration: normalize every `RawRecord`, sort into canonical
//! order, and write the `stage1/canonical_records.jsonl` artifact.

use std::path::Path;

use dd_core::determinism::sort_canonical;
use dd_core::domain::{CanonicalRecord, RawRecord};
use dd_core::error::EngineResult;
use dd_io::jsonl::write_jsonl_atomic;

pub const NAME: &str = "canonical_records";
pub const REL_PATH: &str = "stage1/canonical_records.jsonl";

pub fn run(out_dir: &Path, raw_records: &[RawRecord]) -> EngineResult<Vec<CanonicalRecord>> {
    let mut records: Vec<CanonicalRecord> =
        raw_records.iter().map(dd_algo::normalize_record).collect();
    sort_canonical(&mut records);
    write_jsonl_atomic(&out_dir.join(REL_PATH), &records)?;
    Ok(records)
}
