//! Stage 6 orchestration: merge every cluster into its surviving record and
//! write the `artifacts/merged_records.jsonl` and
//! `artifacts/clusters_enriched.jsonl` artifacts. The latter joins each
//! cluster (already carrying its own `edges`) with its merged record, for
//! audit without cross-referencing two files.

use std::collections::BTreeMap;
use std::path::Path;

use dd_core::determinism::sort_canonical;
use dd_core::domain::CanonicalRecord;
use dd_core::error::EngineResult;
use dd_core::ids::{ClusterId, RecordId};
use dd_core::pairs::{Cluster, MergedRecord, PairDecision};
use dd_io::jsonl::write_jsonl_atomic;
use serde::Serialize;

pub const NAME: &str = "merged_records";
pub const REL_PATH: &str = "artifacts/merged_records.jsonl";
pub const ENRICHED_NAME: &str = "clusters_enriched";
pub const ENRICHED_REL_PATH: &str = "artifacts/clusters_enriched.jsonl";

#[derive(Clone, Debug, Serialize)]
pub struct ClusterEnriched {
    pub cluster_id: ClusterId,
    pub members: Vec<RecordId>,
    pub merged_record: MergedRecord,
    pub decisions: Vec<PairDecision>,
    pub anti_transitivity_split: bool,
}

pub fn run(
    out_dir: &Path,
    records_by_id: &BTreeMap<RecordId, CanonicalRecord>,
    clusters: &[Cluster],
) -> EngineResult<Vec<MergedRecord>> {
    let mut merged: Vec<MergedRecord> = clusters
        .iter()
        .map(|c| dd_algo::merge_cluster(c, records_by_id))
        .collect();
    sort_canonical(&mut merged);
    write_jsonl_atomic(&out_dir.join(REL_PATH), &merged)?;

    let merged_by_cluster: BTreeMap<_, _> =
        merged.iter().map(|m| (m.cluster_id.clone(), m)).collect();
    let mut enriched: Vec<ClusterEnriched> = clusters
        .iter()
        .map(|c| ClusterEnriched {
            cluster_id: c.id.clone(),
            members: c.members.clone(),
            merged_record: merged_by_cluster[&c.id].clone(),
            decisions: c.edges.clone(),
            anti_transitivity_split: c.anti_transitivity_split,
        })
        .collect();
    enriched.sort_by(|a, b| a.cluster_id.cmp(&b.cluster_id));
    write_jsonl_atomic(&out_dir.join(ENRICHED_REL_PATH), &enriched)?;

    Ok(merged)
}
