//! Record lifecycle types: `RawRecord` in, `CanonicalRecord` out of
//! Stage 1. Both are immutable once constructed — later stages only ever add
//! side tables keyed by `id`, so edges and cluster membership never need
//! cyclic pointers between records.

use alloc::string::String;
use alloc::vec::Vec;

use crate::ids::RecordId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A raw `(tag, value)` record as produced by an external format tokenizer.
#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawRecord {
    pub id: RecordId,
    pub source_file: String,
    pub source_byte_offset: u64,
    /// Ordered `(tag, value)` pairs, format-specific (`TI`, `AU`, `DO`, ...).
    pub fields: Vec<(String, String)>,
}

impl RawRecord {
    /// First value for `tag`, if any (tags are not required to be unique).
    pub fn get(&self, tag: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, v)| v.as_str())
    }

    /// All values for `tag`, in document order.
    pub fn get_all<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a str> {
        self.fields
            .iter()
            .filter(move |(t, _)| t == tag)
            .map(|(_, v)| v.as_str())
    }
}

/// A normalized author: casefolded family name plus given-name initials.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Author {
    pub family: String,
    /// Each given name reduced to its first grapheme cluster, casefolded,
    /// concatenated without separators (e.g. "J", "JA").
    pub given_initials: String,
}

/// Closed publication-type enumeration: format-specific codes map onto this
/// set via a fixed table.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RecordType {
    Journal,
    Conference,
    Book,
    Chapter,
    Thesis,
    Preprint,
    #[default]
    Other,
}

impl RecordType {
    pub const fn as_str(self) -> &'static str {
        match self {
            RecordType::Journal => "journal",
            RecordType::Conference => "conference",
            RecordType::Book => "book",
            RecordType::Chapter => "chapter",
            RecordType::Thesis => "thesis",
            RecordType::Preprint => "preprint",
            RecordType::Other => "other",
        }
    }
}

/// The normalized unit of deduplication.
///
/// Invariants enforced by `dd_algo::normalize`, not by this type itself
/// (construction here is infallible — normalization never rejects a
/// record):
/// - `id` unique within a run (enforced by the caller feeding Stage 1)
/// - normalized fields are idempotent under renormalization
/// - `doi`/`pmid`, when present, satisfy their syntactic patterns
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CanonicalRecord {
    pub id: RecordId,
    pub title: Option<String>,
    pub authors: Vec<Author>,
    pub year: Option<i32>,
    pub venue: Option<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub pages_start: Option<i64>,
    pub pages_end: Option<i64>,
    pub doi: Option<String>,
    pub pmid: Option<String>,
    pub abstract_text: Option<String>,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub record_type: RecordType,
    /// Back-pointer to the originating `RawRecord.id` for provenance.
    pub raw_ref: RecordId,
}

impl CanonicalRecord {
    /// Number of non-null scalar/identifier fields (used by survivor
    /// selection's first tiebreak).
    pub fn non_null_field_count(&self) -> usize {
        let mut n = 0;
        if self.title.is_some() {
            n += 1;
        }
        if !self.authors.is_empty() {
            n += 1;
        }
        if self.year.is_some() {
            n += 1;
        }
        if self.venue.is_some() {
            n += 1;
        }
        if self.volume.is_some() {
            n += 1;
        }
        if self.issue.is_some() {
            n += 1;
        }
        if self.pages_start.is_some() {
            n += 1;
        }
        if self.pages_end.is_some() {
            n += 1;
        }
        if self.doi.is_some() {
            n += 1;
        }
        if self.pmid.is_some() {
            n += 1;
        }
        if self.abstract_text.is_some() {
            n += 1;
        }
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rid(s: &str) -> RecordId {
        RecordId::new(s).unwrap()
    }

    #[test]
    fn raw_record_get_returns_first_match() {
        let r = RawRecord {
            id: rid("r1"),
            source_file: "f.ris".into(),
            source_byte_offset: 0,
            fields: alloc::vec![
                ("TI".into(), "First Title".into()),
                ("TI".into(), "Second".into()),
            ],
        };
        assert_eq!(r.get("TI"), Some("First Title"));
        assert_eq!(r.get_all("TI").count(), 2);
        assert_eq!(r.get("DO"), None);
    }

    #[test]
    fn non_null_field_count_counts_authors_as_one() {
        let r = CanonicalRecord {
            id: rid("a"),
            title: Some("t".into()),
            authors: alloc::vec![Author {
                family: "smith".into(),
                given_initials: "j".into(),
            }],
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
            raw_ref: rid("raw1"),
        };
        assert_eq!(r.non_null_field_count(), 2);
    }
}
