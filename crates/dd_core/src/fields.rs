//! `FieldName` — the closed field enumeration used by Fellegi–Sunter scoring.
//! Fields are a fixed enumeration with a fixed comparator table rather than
//! an open dictionary, so weight lookup and bit-pattern indexing stay total.
//!
//! The `ALL` order below is the single fixed enumeration order used
//! everywhere a per-field computation must be deterministic across
//! platforms: field comparison in `dd_algo::compare`, weight lookup and
//! log-likelihood aggregation in `dd_algo::score`, and the `agreement_pattern`
//! bitmask (bit `i` is field `ALL[i]`).

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FieldName {
    Doi,
    Pmid,
    Title,
    Authors,
    Year,
    Venue,
    Volume,
    Issue,
    Pages,
}

impl FieldName {
    /// Fixed enumeration order. `agreement_pattern` bit `i` corresponds to
    /// `ALL[i]`; both `dd_algo::compare` and `dd_algo::score` iterate in
    /// exactly this order.
    pub const ALL: [FieldName; 9] = [
        FieldName::Doi,
        FieldName::Pmid,
        FieldName::Title,
        FieldName::Authors,
        FieldName::Year,
        FieldName::Venue,
        FieldName::Volume,
        FieldName::Issue,
        FieldName::Pages,
    ];

    pub const fn bit(self) -> u16 {
        1u16 << (self as u16)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            FieldName::Doi => "doi",
            FieldName::Pmid => "pmid",
            FieldName::Title => "title",
            FieldName::Authors => "authors",
            FieldName::Year => "year",
            FieldName::Venue => "venue",
            FieldName::Volume => "volume",
            FieldName::Issue => "issue",
            FieldName::Pages => "pages",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
