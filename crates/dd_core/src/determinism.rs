//! Determinism utilities: stable ordering & order-independent reduction.
//! Every stage's artifact is a total order over a deterministic key, so
//! re-running a stage on the same input byte-for-byte reproduces the same
//! artifact, field order included.
//!
//! This module is **I/O-free**. It provides:
//! - Stable total orders for the pairwise/cluster artifact types
//! - Canonical in-place sort helpers for each stage's output
//! - A deterministic reduce helper (independent of fold order if the
//!   combiner is associative)
//! - A trait for "canonical bytes" (interface only; implemented in `dd_io`)

use core::cmp::Ordering;

use alloc::vec::Vec;

use crate::domain::CanonicalRecord;
use crate::pairs::{CandidatePair, Cluster, MergedRecord, PairDecision, ScoredPair};

/// Provide a **total**, stable order for values that must sort canonically.
pub trait StableOrd {
    fn stable_cmp(&self, other: &Self) -> Ordering;
}

impl StableOrd for CanonicalRecord {
    /// Stage 1 artifact order: ascending `id`.
    #[inline]
    fn stable_cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl StableOrd for CandidatePair {
    /// Stage 2 artifact order: ascending `(left, right)`.
    #[inline]
    fn stable_cmp(&self, other: &Self) -> Ordering {
        (&self.left, &self.right).cmp(&(&other.left, &other.right))
    }
}

impl StableOrd for ScoredPair {
    /// Stage 3 artifact order mirrors Stage 2: ascending `(left, right)`.
    #[inline]
    fn stable_cmp(&self, other: &Self) -> Ordering {
        (&self.left, &self.right).cmp(&(&other.left, &other.right))
    }
}

impl StableOrd for PairDecision {
    /// Stage 4 artifact order mirrors Stage 2/3: ascending `(left, right)`.
    #[inline]
    fn stable_cmp(&self, other: &Self) -> Ordering {
        (&self.left, &self.right).cmp(&(&other.left, &other.right))
    }
}

impl StableOrd for Cluster {
    /// Stage 5 artifact order: ascending `id` (== `min(member_id)`).
    #[inline]
    fn stable_cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl StableOrd for MergedRecord {
    /// Stage 6 artifact order mirrors Stage 5: ascending `cluster_id`.
    #[inline]
    fn stable_cmp(&self, other: &Self) -> Ordering {
        self.cluster_id.cmp(&other.cluster_id)
    }
}

/// Sort any `StableOrd` slice in place into canonical order.
#[inline]
pub fn sort_canonical<T: StableOrd>(xs: &mut [T]) {
    xs.sort_by(|a, b| a.stable_cmp(b));
}

/// Sort `Cluster::members` ascending by `RecordId` and `Cluster::edges`
/// ascending by `(left, right)` — called once per cluster before the
/// cluster itself is emitted.
#[inline]
pub fn sort_cluster_members(cluster: &mut Cluster) {
    cluster.members.sort();
    sort_canonical(&mut cluster.edges);
}

/// Deterministically reduce a vector by first sorting it canonically and
/// then folding with the provided associative `combine`. Returns `None` for
/// an empty input.
#[inline]
pub fn reduce_deterministic<T, F>(mut items: Vec<T>, combine: F) -> Option<T>
where
    T: StableOrd,
    F: Fn(T, T) -> T,
{
    if items.is_empty() {
        return None;
    }
    items.sort_by(|a, b| a.stable_cmp(b));
    let mut it = items.into_iter();
    let first = it.next().unwrap();
    Some(it.fold(first, |acc, x| combine(acc, x)))
}

/// Types that can emit **canonical bytes** suitable for hashing or JSONL
/// serialization. Implementation lives in `dd_io::canonical_json`; this is
/// the shared interface so `dd_algo`/`dd_pipeline` can require it without
/// depending on `dd_io` directly.
pub trait HashCanon {
    fn canonical_bytes(&self) -> Vec<u8>;
}
