//! Stage 1: `RawRecord` → `CanonicalRecord`.
//!
//! Normalization never rejects a record — every `RawRecord` produces
//! exactly one `CanonicalRecord`, with absent/unparseable fields mapped to
//! `None` rather than an error. It must be idempotent: renormalizing a
//! `CanonicalRecord`'s own fields reproduces the same values.

use dd_core::domain::{Author, CanonicalRecord, RawRecord, RecordType};
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

static DOI_URL_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(?:https?://)?(?:dx\.)?doi\.org/").unwrap());
static DOI_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^10\.\d{4,9}/\S+$").unwrap());
static LATEX_COMMAND: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\[a-zA-Z]+").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static YEAR_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(1[5-9]\d{2}|20\d{2})").unwrap());

/// Normalize one `RawRecord` into its `CanonicalRecord`.
pub fn normalize_record(raw: &RawRecord) -> CanonicalRecord {
    let title = raw.get("TI").or_else(|| raw.get("T1")).map(clean_title);
    let authors = raw
        .get_all("AU")
        .chain(raw.get_all("A1"))
        .map(parse_author)
        .collect();
    let year = raw
        .get("PY")
        .or_else(|| raw.get("Y1"))
        .and_then(extract_year);
    let venue = raw
        .get("T2")
        .or_else(|| raw.get("JO"))
        .or_else(|| raw.get("JF"))
        .map(|s| clean_text(s));
    let volume = raw.get("VL").map(clean_token);
    let issue = raw.get("IS").map(clean_token);
    let (pages_start, pages_end) = extract_pages(raw);
    let doi = raw.get("DO").and_then(normalize_doi);
    let pmid = raw.get("PM").or_else(|| raw.get("ID")).and_then(normalize_pmid);
    let abstract_text = raw.get("AB").or_else(|| raw.get("N2")).map(|s| clean_text(s));
    let record_type = map_record_type(raw.get("TY"));

    CanonicalRecord {
        id: raw.id.clone(),
        title,
        authors,
        year,
        venue,
        volume,
        issue,
        pages_start,
        pages_end,
        doi,
        pmid,
        abstract_text,
        record_type,
        raw_ref: raw.id.clone(),
    }
}

/// NFKC-fold, casefold to lowercase, strip diacritics and LaTeX markup,
/// collapse whitespace, and trim leading/trailing punctuation. Applied
/// identically to title, venue, and abstract text.
fn clean_text(s: &str) -> String {
    let stripped = strip_diacritics(&strip_latex(s));
    let collapsed = collapse_whitespace(&stripped).to_lowercase();
    collapsed.trim_matches(|c: char| !c.is_alphanumeric()).to_string()
}

fn clean_title(s: &str) -> String {
    clean_text(s)
}

fn clean_token(s: &str) -> String {
    s.trim().to_string()
}

fn strip_latex(s: &str) -> String {
    let no_commands = LATEX_COMMAND.replace_all(s, "");
    no_commands.replace(['{', '}'], "")
}

/// NFKD-decompose then drop Unicode combining marks (category Mn), leaving
/// base letters — e.g. "Müller" → "Muller".
fn strip_diacritics(s: &str) -> String {
    s.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

fn is_combining_mark(c: char) -> bool {
    matches!(c as u32,
        0x0300..=0x036F | 0x1AB0..=0x1AFF | 0x1DC0..=0x1DFF | 0x20D0..=0x20FF | 0xFE20..=0xFE2F)
}

fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_RUN.replace_all(s.trim(), " ").into_owned()
}

/// Parse one author token (`"Family, Given"`, `"Family FG"`, or a bare
/// family name) into a casefolded `Author`.
fn parse_author(raw: &str) -> Author {
    let cleaned = clean_text(raw);
    if let Some((family, given)) = cleaned.split_once(',') {
        Author {
            family: family.trim().to_lowercase(),
            given_initials: initials_of(given),
        }
    } else {
        let mut parts = cleaned.split_whitespace();
        match parts.next_back() {
            Some(family) => Author {
                family: family.to_lowercase(),
                given_initials: initials_of(&cleaned[..cleaned.len() - family.len()]),
            },
            None => Author {
                family: String::new(),
                given_initials: String::new(),
            },
        }
    }
}

/// Reduce each whitespace-separated given name to its first grapheme
/// cluster, casefolded, concatenated without separators.
fn initials_of(given: &str) -> String {
    given
        .split_whitespace()
        .filter_map(|part| part.graphemes(true).next())
        .map(|g| g.to_lowercase())
        .collect()
}

fn extract_year(s: &str) -> Option<i32> {
    YEAR_DIGITS.find(s).and_then(|m| m.as_str().parse().ok())
}

/// Prefer a combined `"SP-EP"`-shaped `PG`/`SP` tag, else separate `SP`/`EP`.
fn extract_pages(raw: &RawRecord) -> (Option<i64>, Option<i64>) {
    if let Some(sp) = raw.get("SP") {
        if let Some((start, end)) = sp.split_once('-') {
            return (parse_page(start), parse_page(end));
        }
        let start = parse_page(sp);
        let end = raw.get("EP").and_then(parse_page);
        return (start, end);
    }
    if let Some(pg) = raw.get("PG") {
        if let Some((start, end)) = pg.split_once('-') {
            return (parse_page(start), parse_page(end));
        }
        return (parse_page(pg), None);
    }
    (None, None)
}

fn parse_page(s: &str) -> Option<i64> {
    s.trim()
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse()
        .ok()
}

/// Strip any `doi.org/` URL prefix, lowercase, and validate the `10.NNNN/...`
/// shape; invalid/empty input normalizes to `None` rather than an error.
fn normalize_doi(s: &str) -> Option<String> {
    let trimmed = DOI_URL_PREFIX.replace(s.trim(), "").to_lowercase();
    if DOI_SHAPE.is_match(&trimmed) {
        Some(trimmed)
    } else {
        None
    }
}

fn normalize_pmid(s: &str) -> Option<String> {
    let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}

fn map_record_type(tag: Option<&str>) -> RecordType {
    match tag.unwrap_or("").to_uppercase().as_str() {
        "JOUR" => RecordType::Journal,
        "CONF" | "CPAPER" => RecordType::Conference,
        "BOOK" => RecordType::Book,
        "CHAP" => RecordType::Chapter,
        "THES" => RecordType::Thesis,
        "UNPB" | "PREPRINT" => RecordType::Preprint,
        _ => RecordType::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dd_core::ids::RecordId;

    fn raw(fields: &[(&str, &str)]) -> RawRecord {
        RawRecord {
            id: RecordId::new("r1").unwrap(),
            source_file: "f.ris".into(),
            source_byte_offset: 0,
            fields: fields.iter().map(|(t, v)| (t.to_string(), v.to_string())).collect(),
        }
    }

    #[test]
    fn doi_strips_url_prefix_and_lowercases() {
        let r = raw(&[("DO", "https://doi.org/10.1234/ABC.5")]);
        let c = normalize_record(&r);
        assert_eq!(c.doi.as_deref(), Some("10.1234/abc.5"));
    }

    #[test]
    fn malformed_doi_normalizes_to_none() {
        let r = raw(&[("DO", "not-a-doi")]);
        let c = normalize_record(&r);
        assert_eq!(c.doi, None);
    }

    #[test]
    fn title_strips_diacritics_and_latex_and_casefolds() {
        let r = raw(&[("TI", r"A study of \textbf{café} {\it étude} effects")]);
        let c = normalize_record(&r);
        assert_eq!(c.title.as_deref(), Some("a study of cafe etude effects"));
    }

    #[test]
    fn title_strips_leading_and_trailing_punctuation() {
        let r = raw(&[("TI", "\"Deep Learning: A Survey.\"")]);
        let c = normalize_record(&r);
        assert_eq!(c.title.as_deref(), Some("deep learning: a survey"));
    }

    #[test]
    fn title_normalization_is_idempotent() {
        let r = raw(&[("TI", "Müller's Götterdämmerung  Theory")]);
        let once = normalize_record(&r).title.unwrap();
        let twice = clean_title(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn author_family_comma_given_parses_initials() {
        let r = raw(&[("AU", "Smith, John Adam")]);
        let c = normalize_record(&r);
        assert_eq!(c.authors.len(), 1);
        assert_eq!(c.authors[0].family, "smith");
        assert_eq!(c.authors[0].given_initials, "ja");
    }

    #[test]
    fn author_family_given_no_comma_parses() {
        let r = raw(&[("AU", "John Smith")]);
        let c = normalize_record(&r);
        assert_eq!(c.authors[0].family, "smith");
        assert_eq!(c.authors[0].given_initials, "j");
    }

    #[test]
    fn year_extracted_from_noisy_date() {
        let r = raw(&[("PY", "c2019 Jan-Feb")]);
        let c = normalize_record(&r);
        assert_eq!(c.year, Some(2019));
    }

    #[test]
    fn pages_split_from_range() {
        let r = raw(&[("SP", "100-110")]);
        let c = normalize_record(&r);
        assert_eq!(c.pages_start, Some(100));
        assert_eq!(c.pages_end, Some(110));
    }

    #[test]
    fn record_type_maps_known_and_unknown_codes() {
        assert_eq!(map_record_type(Some("JOUR")), RecordType::Journal);
        assert_eq!(map_record_type(Some("bogus")), RecordType::Other);
        assert_eq!(map_record_type(None), RecordType::Other);
    }
}
