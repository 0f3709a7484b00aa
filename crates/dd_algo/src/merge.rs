//! Stage 6: survivor selection and field-level merge.
//!
//! Survivor selection ranks members by: (1) DOI present, tie broken by PMID
//! present, tie broken by most non-null fields; (2) longest non-null
//! abstract; (3) most recent year; (4) lexicographically smallest id. Each
//! level only breaks ties left by the one before it. The survivor's own
//! fields are kept; any field still `None` on the survivor is filled from
//! the first other member, scanned in the same rank order, that has a
//! value — never ascending `RecordId` order, so a clear second-best
//! candidate is preferred over an arbitrary one. Every fill is recorded in
//! `provenance`. Authors are the deduplicated union across every member,
//! attributed to the survivor, since co-authorship metadata is commonly
//! incomplete on any single source record — the survivor's own author
//! order is kept as-is, and novel authors from other members are appended
//! in rank order, never resorted alphabetically.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use dd_core::domain::CanonicalRecord;
use dd_core::fields::FieldName;
use dd_core::ids::RecordId;
use dd_core::pairs::{Cluster, MergedRecord};

/// Rank two candidates for survivorship. `Greater` means `a` outranks `b`.
fn compare_candidates(a: &CanonicalRecord, b: &CanonicalRecord) -> Ordering {
    a.doi.is_some()
        .cmp(&b.doi.is_some())
        .then_with(|| a.pmid.is_some().cmp(&b.pmid.is_some()))
        .then_with(|| a.non_null_field_count().cmp(&b.non_null_field_count()))
        .then_with(|| abstract_len(a).cmp(&abstract_len(b)))
        .then_with(|| year_key(a).cmp(&year_key(b)))
        // Reversed: the smaller id must win, i.e. rank as "greater".
        .then_with(|| b.id.cmp(&a.id))
}

fn abstract_len(r: &CanonicalRecord) -> usize {
    r.abstract_text.as_ref().map_or(0, |s| s.len())
}

fn year_key(r: &CanonicalRecord) -> i32 {
    r.year.unwrap_or(i32::MIN)
}

/// The member `compare_candidates` ranks highest.
pub fn select_survivor(members: &[&CanonicalRecord]) -> RecordId {
    members
        .iter()
        .max_by(|a, b| compare_candidates(a, b))
        .map(|r| r.id.clone())
        .expect("cluster is never empty")
}

/// `members` ordered by survivor rank, most preferred first. Field fill
/// order follows this list, not ascending `RecordId`.
fn rank_members_desc<'a>(members: &[&'a CanonicalRecord]) -> Vec<&'a CanonicalRecord> {
    let mut ranked: Vec<&CanonicalRecord> = members.to_vec();
    ranked.sort_by(|a, b| compare_candidates(b, a));
    ranked
}

pub fn merge_cluster(
    cluster: &Cluster,
    records_by_id: &BTreeMap<RecordId, CanonicalRecord>,
) -> MergedRecord {
    let members: Vec<&CanonicalRecord> =
        cluster.members.iter().map(|id| &records_by_id[id]).collect();
    let ranked = rank_members_desc(&members);

    let survivor_id = cluster.survivor_id.clone();
    let survivor = &records_by_id[&survivor_id];
    let mut record = survivor.clone();
    let mut provenance: BTreeMap<FieldName, RecordId> = BTreeMap::new();

    note_present(&mut provenance, FieldName::Title, &record.title, &survivor_id);
    note_present(&mut provenance, FieldName::Doi, &record.doi, &survivor_id);
    note_present(&mut provenance, FieldName::Pmid, &record.pmid, &survivor_id);
    note_present(&mut provenance, FieldName::Venue, &record.venue, &survivor_id);
    note_present(&mut provenance, FieldName::Volume, &record.volume, &survivor_id);
    note_present(&mut provenance, FieldName::Issue, &record.issue, &survivor_id);
    if record.year.is_some() {
        provenance.insert(FieldName::Year, survivor_id.clone());
    }
    if record.pages_start.is_some() {
        provenance.insert(FieldName::Pages, survivor_id.clone());
    }
    if !record.authors.is_empty() {
        provenance.insert(FieldName::Authors, survivor_id.clone());
    }

    for other in ranked.iter().filter(|r| r.id != survivor_id) {
        fill_if_absent(&mut record.title, &other.title, FieldName::Title, other, &mut provenance);
        fill_if_absent(&mut record.venue, &other.venue, FieldName::Venue, other, &mut provenance);
        fill_if_absent(&mut record.volume, &other.volume, FieldName::Volume, other, &mut provenance);
        fill_if_absent(&mut record.issue, &other.issue, FieldName::Issue, other, &mut provenance);
        fill_if_absent(&mut record.doi, &other.doi, FieldName::Doi, other, &mut provenance);
        fill_if_absent(&mut record.pmid, &other.pmid, FieldName::Pmid, other, &mut provenance);
        if record.abstract_text.is_none() {
            if let Some(value) = &other.abstract_text {
                record.abstract_text = Some(value.clone());
            }
        }
        if record.year.is_none() {
            if let Some(year) = other.year {
                record.year = Some(year);
                provenance.insert(FieldName::Year, other.id.clone());
            }
        }
        if record.pages_start.is_none() {
            record.pages_start = other.pages_start;
            record.pages_end = other.pages_end;
            if other.pages_start.is_some() {
                provenance.insert(FieldName::Pages, other.id.clone());
            }
        }
    }

    // Preserve the survivor's own author ordering, then append novel
    // authors in member-scan (rank) order; `seen` only dedups, it never
    // determines output order.
    let mut seen: BTreeSet<(String, String)> = BTreeSet::new();
    let mut authors: Vec<dd_core::domain::Author> = Vec::new();
    for author in &survivor.authors {
        if seen.insert((author.family.clone(), author.given_initials.clone())) {
            authors.push(author.clone());
        }
    }
    for other in ranked.iter().filter(|r| r.id != survivor_id) {
        for author in &other.authors {
            if seen.insert((author.family.clone(), author.given_initials.clone())) {
                authors.push(author.clone());
            }
        }
    }
    record.authors = authors;
    if !record.authors.is_empty() {
        provenance.insert(FieldName::Authors, survivor_id.clone());
    }

    MergedRecord {
        cluster_id: cluster.id.clone(),
        record,
        sources: cluster.members.clone(),
        survivor: survivor_id,
        provenance,
    }
}

fn note_present(
    provenance: &mut BTreeMap<FieldName, RecordId>,
    field: FieldName,
    value: &Option<String>,
    owner: &RecordId,
) {
    if value.is_some() {
        provenance.insert(field, owner.clone());
    }
}

fn fill_if_absent(
    field: &mut Option<String>,
    candidate: &Option<String>,
    name: FieldName,
    other: &CanonicalRecord,
    provenance: &mut BTreeMap<FieldName, RecordId>,
) {
    if field.is_none() {
        if let Some(value) = candidate {
            *field = Some(value.clone());
            provenance.insert(name, other.id.clone());
        }
    }
}
