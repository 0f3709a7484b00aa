//! dd_pipeline — stage orchestration for the bibliographic deduplication
//! engine: wires `dd_algo`'s six stages together, materializes each stage's
//! artifact through `dd_io`, and reports a run summary.
//!
//! `ConfigurationError`/`CalibrationError` are both checked before Stage 1
//! ever runs, so a bad config or a corrupt calibration table never leaves a
//! partial artifact set on disk.

#![forbid(unsafe_code)]

mod block_stage;
mod cluster_stage;
mod decide_stage;
mod merge_stage;
mod normalize_stage;
mod score_stage;

use std::collections::BTreeMap;
use std::path::Path;

use dd_core::config::EngineConfig;
use dd_core::domain::RawRecord;
use dd_core::error::{EngineError, EngineResult};
use dd_core::pairs::Decision;
use dd_io::calibration::Calibration;
use serde::Serialize;

pub use merge_stage::ClusterEnriched;

/// The run summary: the one artifact a caller needs to judge a run at a
/// glance, without re-reading every JSONL file. `output_files` maps each
/// artifact's short name to its path relative to `out_dir`.
#[derive(Clone, Debug, Serialize)]
pub struct RunSummary {
    pub success: bool,
    pub total_records: usize,
    pub total_candidates: usize,
    pub total_duplicates_auto: usize,
    pub total_review_pairs: usize,
    pub output_files: BTreeMap<String, String>,
    pub error_message: Option<String>,
}

/// Run the full pipeline, writing every stage's artifact into `out_dir`.
///
/// Stage order is fixed: normalize -> block -> score -> decide -> cluster ->
/// merge. Each stage's output is sorted into canonical order before it is
/// written, so re-running on the same input reproduces the same bytes.
pub fn run_pipeline(
    config: &EngineConfig,
    calibration: &Calibration,
    raw_records: &[RawRecord],
    out_dir: &Path,
) -> EngineResult<RunSummary> {
    config.validate().map_err(EngineError::Configuration)?;

    std::fs::create_dir_all(out_dir)?;

    let records = normalize_stage::run(out_dir, raw_records)?;
    let records_by_id: BTreeMap<_, _> =
        records.iter().map(|r| (r.id.clone(), r.clone())).collect();

    let candidates = block_stage::run(out_dir, config, &records)?;
    let scored = score_stage::run(out_dir, calibration, config, &records_by_id, &candidates)?;
    let (_t_high, decisions) = decide_stage::run(out_dir, calibration, config, &scored)?;
    let clusters = cluster_stage::run(out_dir, &records, &records_by_id, &decisions)?;
    merge_stage::run(out_dir, &records_by_id, &clusters)?;

    let total_duplicates_auto = decisions
        .iter()
        .filter(|d| d.decision == Decision::AutoMatch)
        .count();
    let total_review_pairs = decisions
        .iter()
        .filter(|d| d.decision == Decision::Review)
        .count();

    let output_files = BTreeMap::from([
        (normalize_stage::NAME.to_string(), normalize_stage::REL_PATH.to_string()),
        (block_stage::NAME.to_string(), block_stage::REL_PATH.to_string()),
        (score_stage::NAME.to_string(), score_stage::REL_PATH.to_string()),
        (decide_stage::NAME.to_string(), decide_stage::REL_PATH.to_string()),
        (cluster_stage::NAME.to_string(), cluster_stage::REL_PATH.to_string()),
        (merge_stage::NAME.to_string(), merge_stage::REL_PATH.to_string()),
        (
            merge_stage::ENRICHED_NAME.to_string(),
            merge_stage::ENRICHED_REL_PATH.to_string(),
        ),
    ]);

    Ok(RunSummary {
        success: true,
        total_records: records.len(),
        total_candidates: candidates.len(),
        total_duplicates_auto,
        total_review_pairs,
        output_files,
        error_message: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dd_core::ids::RecordId;

    fn raw(id: &str, doi: Option<&str>, title: &str) -> RawRecord {
        let mut fields = vec![("TI".to_string(), title.to_string())];
        if let Some(d) = doi {
            fields.push(("DO".to_string(), d.to_string()));
        }
        RawRecord {
            id: RecordId::new(id).unwrap(),
            source_file: "f.ris".into(),
            source_byte_offset: 0,
            fields,
        }
    }

    #[test]
    fn empty_input_produces_empty_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::default();
        let calibration = Calibration::default_embedded().unwrap();
        let summary = run_pipeline(&config, &calibration, &[], dir.path()).unwrap();
        assert!(summary.success);
        assert_eq!(summary.total_records, 0);
        assert_eq!(summary.total_candidates, 0);
        for path in summary.output_files.values() {
            assert!(dir.path().join(path).exists(), "missing {path}");
        }
    }

    #[test]
    fn shared_doi_pair_becomes_one_cluster() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::default();
        let calibration = Calibration::default_embedded().unwrap();
        let raw_records = vec![
            raw("a", Some("10.1/x"), "Deep Learning"),
            raw("b", Some("10.1/x"), "Deep Learning"),
        ];
        let summary = run_pipeline(&config, &calibration, &raw_records, dir.path()).unwrap();
        assert_eq!(summary.total_records, 2);
        assert_eq!(summary.total_duplicates_auto, 1);
    }

    #[test]
    fn invalid_config_fails_before_writing_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = EngineConfig::default();
        config.candidate_blockers.clear();
        let calibration = Calibration::default_embedded().unwrap();
        let result = run_pipeline(&config, &calibration, &[], dir.path());
        assert!(result.is_err());
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }
}
