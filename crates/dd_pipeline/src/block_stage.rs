//! Stage 2 orchestration: generate candidate pairs, sort, and write the
//! `stage2/candidate_pairs.jsonl` artifact.

use std::path::Path;

use dd_core::config::EngineConfig;
use dd_core::determinism::sort_canonical;
use dd_core::domain::CanonicalRecord;
use dd_core::error::EngineResult;
use dd_core::pairs::CandidatePair;
use dd_io::jsonl::write_jsonl_atomic;

pub const NAME: &str = "candidate_pairs";
pub const REL_PATH: &str = "stage2/candidate_pairs.jsonl";

pub fn run(
    out_dir: &Path,
    config: &EngineConfig,
    records: &[CanonicalRecord],
) -> EngineResult<Vec<CandidatePair>> {
    let mut pairs = dd_algo::generate_candidates(config, records);
    sort_canonical(&mut pairs);
    write_jsonl_atomic(&out_dir.join(REL_PATH), &pairs)?;
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dd_core::domain::RecordType;
    use dd_core::ids::RecordId;

    fn rec(id: &str, doi: &str) -> CanonicalRecord {
        CanonicalRecord {
            id: RecordId::new(id).unwrap(),
            title: None,
            authors: Vec::new(),
            year: None,
            venue: None,
            volume: None,
            issue: None,
            pages_start: None,
            pages_end: None,
            doi: Some(doi.into()),
            pmid: None,
            abstract_text: None,
            record_type: RecordType::Journal,
            raw_ref: RecordId::new(id).unwrap(),
        }
    }

    #[test]
    fn writes_candidate_pairs_for_shared_doi() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::default();
        let records = vec![rec("a", "10.1/x"), rec("b", "10.1/x")];
        let pairs = run(dir.path(), &config, &records).unwrap();
        assert_eq!(pairs.len(), 1);
        assert!(dir.path().join(REL_PATH).exists());
    }
}
