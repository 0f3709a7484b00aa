//! Stage 3 (part 1): per-field comparators producing quantized agreement
//! levels `{0.0, 0.5, 1.0}`. Field aggregation into a single
//! Fellegi–Sunter score happens in `score`.

use dd_core::domain::{Author, CanonicalRecord};
use dd_core::fields::FieldName;
use dd_core::pairs::FieldAgreement;

/// Compare every `FieldName` between `a` and `b`, in `FieldName::ALL` order.
pub fn compare_fields(a: &CanonicalRecord, b: &CanonicalRecord) -> Vec<FieldAgreement> {
    FieldName::ALL
        .into_iter()
        .map(|field| compare_one(field, a, b))
        .collect()
}

fn compare_one(field: FieldName, a: &CanonicalRecord, b: &CanonicalRecord) -> FieldAgreement {
    match field {
        FieldName::Doi => exact_opt(field, a.doi.as_deref(), b.doi.as_deref()),
        FieldName::Pmid => exact_opt(field, a.pmid.as_deref(), b.pmid.as_deref()),
        FieldName::Title => fuzzy_opt(field, a.title.as_deref(), b.title.as_deref()),
        FieldName::Authors => compare_authors(a, b),
        FieldName::Year => compare_year(a.year, b.year),
        FieldName::Venue => fuzzy_opt(field, a.venue.as_deref(), b.venue.as_deref()),
        FieldName::Volume => exact_opt(field, a.volume.as_deref(), b.volume.as_deref()),
        FieldName::Issue => exact_opt(field, a.issue.as_deref(), b.issue.as_deref()),
        FieldName::Pages => compare_pages(a, b),
    }
}

fn missing(field: FieldName) -> FieldAgreement {
    FieldAgreement {
        field,
        agreement: 0.0,
        missing: true,
    }
}

fn present(field: FieldName, agreement: f64) -> FieldAgreement {
    FieldAgreement {
        field,
        agreement,
        missing: false,
    }
}

fn exact_opt(field: FieldName, a: Option<&str>, b: Option<&str>) -> FieldAgreement {
    match (a, b) {
        (Some(x), Some(y)) => present(field, if x == y { 1.0 } else { 0.0 }),
        _ => missing(field),
    }
}

/// Quantize a raw similarity/overlap score to `{1.0, 0.5, 0.0}`: `>= 0.85`
/// agrees, `[0.5, 0.85)` partially agrees, `< 0.5` disagrees.
fn quantize(sim: f64) -> f64 {
    if sim >= 0.85 {
        1.0
    } else if sim >= 0.5 {
        0.5
    } else {
        0.0
    }
}

/// Jaro–Winkler similarity, quantized. Title additionally floors anything
/// below 0.6 to 0, overriding the general `[0.5, 0.85)` partial band.
fn fuzzy_opt(field: FieldName, a: Option<&str>, b: Option<&str>) -> FieldAgreement {
    match (a, b) {
        (Some(x), Some(y)) => {
            let sim = strsim::jaro_winkler(&x.to_lowercase(), &y.to_lowercase());
            let level = if field == FieldName::Title && sim < 0.6 {
                0.0
            } else {
                quantize(sim)
            };
            present(field, level)
        }
        _ => missing(field),
    }
}

fn compare_year(a: Option<i32>, b: Option<i32>) -> FieldAgreement {
    match (a, b) {
        (Some(x), Some(y)) => {
            let diff = (x - y).abs();
            let level = if diff == 0 {
                1.0
            } else if diff == 1 {
                0.5
            } else {
                0.0
            };
            present(FieldName::Year, level)
        }
        _ => missing(FieldName::Year),
    }
}

fn compare_pages(a: &CanonicalRecord, b: &CanonicalRecord) -> FieldAgreement {
    match (a.pages_start, b.pages_start) {
        (Some(_), Some(_)) => {
            let level = if a.pages_start == b.pages_start && a.pages_end == b.pages_end {
                1.0
            } else {
                0.0
            };
            present(FieldName::Pages, level)
        }
        _ => missing(FieldName::Pages),
    }
}

/// Overlap coefficient (`|A ∩ B| / min(|A|, |B|)`) of `(family,
/// given_initials)` author sets, quantized.
fn compare_authors(a: &CanonicalRecord, b: &CanonicalRecord) -> FieldAgreement {
    if a.authors.is_empty() || b.authors.is_empty() {
        return missing(FieldName::Authors);
    }
    let set_a: std::collections::BTreeSet<(&str, &str)> = a
        .authors
        .iter()
        .map(|au: &Author| (au.family.as_str(), au.given_initials.as_str()))
        .collect();
    let set_b: std::collections::BTreeSet<(&str, &str)> = b
        .authors
        .iter()
        .map(|au: &Author| (au.family.as_str(), au.given_initials.as_str()))
        .collect();
    let intersection = set_a.intersection(&set_b).count();
    let smaller = set_a.len().min(set_b.len());
    let overlap = if smaller == 0 {
        0.0
    } else {
        intersection as f64 / smaller as f64
    };
    present(FieldName::Authors, quantize(overlap))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dd_core::domain::RecordType;
    use dd_core::ids::RecordId;

    fn rec(id: &str) -> CanonicalRecord {
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
            doi: None,
            pmid: None,
            abstract_text: None,
            record_type: RecordType::Journal,
            raw_ref: RecordId::new(id).unwrap(),
        }
    }

    #[test]
    fn missing_field_is_flagged_missing_not_disagreement() {
        let a = rec("a");
        let b = rec("b");
        let agreements = compare_fields(&a, &b);
        assert!(agreements.iter().all(|fa| fa.missing));
    }

    #[test]
    fn exact_doi_match_is_full_agreement() {
        let mut a = rec("a");
        let mut b = rec("b");
        a.doi = Some("10.1/x".into());
        b.doi = Some("10.1/x".into());
        let agreements = compare_fields(&a, &b);
        let doi = agreements.iter().find(|fa| fa.field == FieldName::Doi).unwrap();
        assert_eq!(doi.agreement, 1.0);
        assert!(!doi.missing);
    }

    #[test]
    fn year_off_by_one_is_partial_agreement() {
        let agreement = compare_year(Some(2020), Some(2021));
        assert_eq!(agreement.agreement, 0.5);
    }

    #[test]
    fn author_overlap_coefficient_ignores_the_larger_sets_extra_members() {
        // b's single author is fully contained in a's two, so the overlap
        // coefficient (1/min(2,1)=1.0) is full agreement even though the
        // sets aren't equal — unlike Jaccard, which would only give 0.5.
        let mut a = rec("a");
        let mut b = rec("b");
        a.authors = vec![
            Author { family: "smith".into(), given_initials: "j".into() },
            Author { family: "doe".into(), given_initials: "a".into() },
        ];
        b.authors = vec![
            Author { family: "smith".into(), given_initials: "j".into() },
        ];
        let agreement = compare_authors(&a, &b);
        assert_eq!(agreement.agreement, 1.0);
    }

    #[test]
    fn author_overlap_below_half_disagrees() {
        let mut a = rec("a");
        let mut b = rec("b");
        a.authors = vec![
            Author { family: "smith".into(), given_initials: "j".into() },
            Author { family: "doe".into(), given_initials: "a".into() },
        ];
        b.authors = vec![
            Author { family: "roe".into(), given_initials: "b".into() },
            Author { family: "lee".into(), given_initials: "c".into() },
        ];
        let agreement = compare_authors(&a, &b);
        assert_eq!(agreement.agreement, 0.0);
    }
}
