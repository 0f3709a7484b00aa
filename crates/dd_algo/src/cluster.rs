//! Stage 5: union-find clustering over `AutoMatch` edges with an
//! anti-transitivity guard.
//!
//! Plain transitive closure over `AutoMatch` pairs can merge records that
//! have no business being in the same cluster together: A–B match, B–C
//! match, A–C explicitly non-match, or — the more common "hub" case —
//! blocking never even generated an A–C candidate, so there is no computed
//! score for that pair at all. Either way A and C end up fused through B
//! without ever being evidenced against each other. Whenever a component
//! contains a pair with no score at or above `t_low`, the "weakest
//! triangle" — the lowest-scoring `AutoMatch` edge inside the offending
//! component — is cut and clustering is recomputed, repeating until every
//! component is free of such pairs.
//! The survivor each cluster will carry into Stage 6 is selected here too,
//! so Stage 6 never has to re-derive it independently of the cluster.

use std::collections::{BTreeMap, BTreeSet};

use dd_core::domain::CanonicalRecord;
use dd_core::ids::{ClusterId, RecordId};
use dd_core::pairs::{Cluster, Decision, PairDecision};

use crate::merge::select_survivor;

struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        UnionFind {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

/// Build clusters for every id in `records_by_id` from `decisions`. Every id
/// appears in exactly one output cluster — singletons included — so the
/// provenance chain into Stage 6 is total.
pub fn cluster_records(
    all_ids: &[RecordId],
    decisions: &[PairDecision],
    records_by_id: &BTreeMap<RecordId, CanonicalRecord>,
) -> Vec<Cluster> {
    let mut index: BTreeMap<RecordId, usize> = BTreeMap::new();
    for id in all_ids {
        let next = index.len();
        index.entry(id.clone()).or_insert(next);
    }

    let mut active_edges: Vec<(RecordId, RecordId, f64)> = decisions
        .iter()
        .filter(|d| d.decision == Decision::AutoMatch)
        .map(|d| (d.left.clone(), d.right.clone(), d.score))
        .collect();

    // Every pair with a computed score at or above `t_low` — both
    // `AutoMatch` and `Review` pairs qualify, only `AutoNonMatch` and
    // never-candidate pairs don't. Anything absent from this set fails the
    // "every within-cluster pair has a computed score >= t_low" condition.
    let evidenced: BTreeSet<(RecordId, RecordId)> = decisions
        .iter()
        .filter(|d| d.score >= d.threshold_low)
        .map(|d| (d.left.clone(), d.right.clone()))
        .collect();

    let mut split_ids: BTreeSet<RecordId> = BTreeSet::new();

    loop {
        let mut uf = UnionFind::new(index.len());
        for (l, r, _) in &active_edges {
            uf.union(index[l], index[r]);
        }

        let offending_root = find_offending_root(&index, &mut uf, &evidenced);

        let Some(root) = offending_root else {
            return build_clusters(&index, &mut uf, decisions, records_by_id, &split_ids);
        };

        let weakest = active_edges
            .iter()
            .enumerate()
            .filter(|(_, (l, r, _))| uf.find(index[l]) == root && uf.find(index[r]) == root)
            .min_by(|(_, (_, _, sa)), (_, (_, _, sb))| {
                sa.partial_cmp(sb).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i);

        match weakest {
            Some(i) => {
                let (l, r, _) = active_edges.remove(i);
                split_ids.insert(l);
                split_ids.insert(r);
            }
            None => {
                // No active edge actually created this contradiction (the
                // conflict nodes coincide in the same component via edges
                // not touching the root directly); nothing more can be
                // cut, so stop to avoid looping forever.
                return build_clusters(&index, &mut uf, decisions, records_by_id, &split_ids);
            }
        }
    }
}

/// Find a union-find root whose component contains two members with no
/// evidenced pair between them — either an explicit `AutoNonMatch`/below-
/// `t_low` decision, or no decision at all because blocking never paired
/// them. Scans every intra-component pair, not just decided ones, so a
/// never-candidate pair is caught the same as an explicit contradiction.
fn find_offending_root(
    index: &BTreeMap<RecordId, usize>,
    uf: &mut UnionFind,
    evidenced: &BTreeSet<(RecordId, RecordId)>,
) -> Option<usize> {
    let mut by_root: BTreeMap<usize, Vec<RecordId>> = BTreeMap::new();
    for (id, &i) in index {
        by_root.entry(uf.find(i)).or_default().push(id.clone());
    }

    for (root, members) in &by_root {
        if members.len() < 2 {
            continue;
        }
        for i in 0..members.len() {
            for j in (i + 1)..members.len() {
                let (a, b) = if members[i] < members[j] {
                    (&members[i], &members[j])
                } else {
                    (&members[j], &members[i])
                };
                if !evidenced.contains(&(a.clone(), b.clone())) {
                    return Some(*root);
                }
            }
        }
    }
    None
}

fn build_clusters(
    index: &BTreeMap<RecordId, usize>,
    uf: &mut UnionFind,
    decisions: &[PairDecision],
    records_by_id: &BTreeMap<RecordId, CanonicalRecord>,
    split_ids: &BTreeSet<RecordId>,
) -> Vec<Cluster> {
    let mut by_root: BTreeMap<usize, BTreeSet<RecordId>> = BTreeMap::new();
    for (id, &i) in index {
        let root = uf.find(i);
        by_root.entry(root).or_default().insert(id.clone());
    }

    let mut clusters: Vec<Cluster> = by_root
        .into_values()
        .map(|members_set| {
            let members: Vec<RecordId> = members_set.iter().cloned().collect();
            let min_member = members.first().expect("cluster is never empty").clone();

            let edges: Vec<PairDecision> = decisions
                .iter()
                .filter(|d| members_set.contains(&d.left) && members_set.contains(&d.right))
                .cloned()
                .collect();

            let cluster_records: Vec<&CanonicalRecord> =
                members.iter().map(|id| &records_by_id[id]).collect();
            let survivor_id = select_survivor(&cluster_records);

            let anti_transitivity_split = members_set.iter().any(|m| split_ids.contains(m));

            Cluster {
                id: ClusterId::from_min_member(&min_member),
                members,
                edges,
                survivor_id,
                anti_transitivity_split,
            }
        })
        .collect();
    clusters.sort_by(|a, b| a.id.cmp(&b.id));
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use dd_core::domain::RecordType;

    fn rid(s: &str) -> RecordId {
        RecordId::new(s).unwrap()
    }

    fn rec(id: &str) -> CanonicalRecord {
        CanonicalRecord {
            id: rid(id),
            title: None,
            authors: Vec::new(),
            year: None,
            venue: None,
            volume: None,
            issue: None,
            pages_start: None,
            pages_end: None,
            doi: None,
            pmid: None,
            abstract_text: None,
            record_type: RecordType::Journal,
            raw_ref: rid(id),
        }
    }

    fn decision(l: &str, r: &str, decision: Decision, score: f64) -> PairDecision {
        PairDecision {
            left: rid(l),
            right: rid(r),
            score,
            decision,
            threshold_low: 0.1,
            threshold_high: 0.9,
            reason: dd_core::pairs::DecisionReason::ScoreAboveHigh,
            short_circuited: false,
        }
    }

    fn map(ids: &[&str]) -> BTreeMap<RecordId, CanonicalRecord> {
        ids.iter().map(|id| (rid(id), rec(id))).collect()
    }

    #[test]
    fn transitive_chain_forms_one_cluster_when_every_pair_is_evidenced() {
        let ids = vec![rid("a"), rid("b"), rid("c")];
        let decisions = vec![
            decision("a", "b", Decision::AutoMatch, 0.9),
            decision("b", "c", Decision::AutoMatch, 0.9),
            decision("a", "c", Decision::AutoMatch, 0.85),
        ];
        let records = map(&["a", "b", "c"]);
        let clusters = cluster_records(&ids, &decisions, &records);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].members.len(), 3);
        assert_eq!(clusters[0].edges.len(), 3);
        assert!(!clusters[0].anti_transitivity_split);
    }

    #[test]
    fn never_candidate_pair_splits_the_hub_like_an_explicit_non_match() {
        // a-b and b-c both matched, but a-c never became a candidate pair at
        // all (no blocker fired): a-c has no computed score, so the
        // component must still be split even though there is no explicit
        // `AutoNonMatch` decision between a and c.
        let ids = vec![rid("a"), rid("b"), rid("c")];
        let decisions = vec![
            decision("a", "b", Decision::AutoMatch, 0.55),
            decision("b", "c", Decision::AutoMatch, 0.95),
        ];
        let records = map(&["a", "b", "c"]);
        let clusters = cluster_records(&ids, &decisions, &records);
        assert_eq!(clusters.len(), 2);
        let bc = clusters.iter().find(|c| c.members.len() == 2).unwrap();
        assert!(bc.members.contains(&rid("b")));
        assert!(bc.members.contains(&rid("c")));
        assert!(bc.anti_transitivity_split);
        let a_only = clusters.iter().find(|c| c.members.len() == 1).unwrap();
        assert_eq!(a_only.members[0], rid("a"));
        assert!(a_only.anti_transitivity_split);
    }

    #[test]
    fn singleton_records_get_their_own_cluster() {
        let ids = vec![rid("a"), rid("b")];
        let records = map(&["a", "b"]);
        let clusters = cluster_records(&ids, &[], &records);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].survivor_id, clusters[0].members[0]);
    }

    #[test]
    fn anti_transitivity_cuts_weakest_edge() {
        let ids = vec![rid("a"), rid("b"), rid("c")];
        let decisions = vec![
            decision("a", "b", Decision::AutoMatch, 0.55),
            decision("b", "c", Decision::AutoMatch, 0.95),
            decision("a", "c", Decision::AutoNonMatch, 0.01),
        ];
        let records = map(&["a", "b", "c"]);
        let clusters = cluster_records(&ids, &decisions, &records);
        assert_eq!(clusters.len(), 2);
        let bc = clusters.iter().find(|c| c.members.len() == 2).unwrap();
        assert!(bc.members.contains(&rid("b")));
        assert!(bc.members.contains(&rid("c")));
        assert!(bc.anti_transitivity_split);
        let a_only = clusters.iter().find(|c| c.members.len() == 1).unwrap();
        assert_eq!(a_only.members[0], rid("a"));
        assert!(a_only.anti_transitivity_split);
    }
}
