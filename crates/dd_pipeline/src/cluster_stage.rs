//! Stage 5 orchestration: run anti-transitivity-safe clustering over the
//! decided pairs and write the `stage5/clusters.jsonl` artifact.
//! Every input record appears in exactly one cluster, singletons included
//! (provenance totality), so `all_ids` is every `CanonicalRecord.id`
//! from Stage 1, not just those touched by a decision.

use std::collections::BTreeMap;
use std::path::Path;

use dd_core::determinism::sort_cluster_members;
use dd_core::domain::CanonicalRecord;
use dd_core::error::EngineResult;
use dd_core::ids::RecordId;
use dd_core::pairs::{Cluster, PairDecision};
use dd_io::jsonl::write_jsonl_atomic;

pub const NAME: &str = "clusters";
pub const REL_PATH: &str = "stage5/clusters.jsonl";

pub fn run(
    out_dir: &Path,
    records: &[CanonicalRecord],
    records_by_id: &BTreeMap<RecordId, CanonicalRecord>,
    decisions: &[PairDecision],
) -> EngineResult<Vec<Cluster>> {
    let all_ids: Vec<_> = records.iter().map(|r| r.id.clone()).collect();
    let mut clusters = dd_algo::cluster_records(&all_ids, decisions, records_by_id);
    for cluster in &mut clusters {
        sort_cluster_members(cluster);
    }
    write_jsonl_atomic(&out_dir.join(REL_PATH), &clusters)?;
    Ok(clusters)
}
