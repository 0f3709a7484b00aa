//! Stage 2: candidate pair generation.
//!
//! Four blockers run independently and their results are merged by
//! `(left, right)`, unioning the `blockers` tag list for any pair more than
//! one strategy proposed:
//!
//! - `Doi`/`Pmid`: exact-match buckets on the normalized identifier.
//! - `YearTitle`: bucket on `(year, first 5 title tokens after stopword
//!   removal)`; records with a null year or fewer than 3 surviving tokens
//!   are skipped.
//! - `Lsh`: MinHash/LSH banding over 5-character shingles of the
//!   concatenated title+venue, for near-duplicates an exact bucket would
//!   miss.
//!
//! `max_pairs_per_record` bounds the candidate set size: pairs are
//! considered in canonical `(left, right)` order and a pair is dropped if
//! either side has already reached the cap.

use std::collections::{BTreeMap, BTreeSet};

use dd_core::config::{BlockerKind, EngineConfig, LshParams};
use dd_core::domain::CanonicalRecord;
use dd_core::ids::RecordId;
use dd_core::pairs::{BlockerTag, CandidatePair};

pub fn generate_candidates(config: &EngineConfig, records: &[CanonicalRecord]) -> Vec<CandidatePair> {
    let mut tags: BTreeMap<(RecordId, RecordId), BTreeSet<BlockerTag>> = BTreeMap::new();

    for kind in &config.candidate_blockers {
        let tag = match kind {
            BlockerKind::Doi => BlockerTag::Doi,
            BlockerKind::Pmid => BlockerTag::Pmid,
            BlockerKind::YearTitle => BlockerTag::YearTitle,
            BlockerKind::Lsh => BlockerTag::Lsh,
        };
        let pairs = match kind {
            BlockerKind::Doi => block_by_key(records, |r| r.doi.clone()),
            BlockerKind::Pmid => block_by_key(records, |r| r.pmid.clone()),
            BlockerKind::YearTitle => block_by_key(records, year_title_key),
            BlockerKind::Lsh => minhash::block_by_lsh(records, &config.lsh),
        };
        for (l, r) in pairs {
            let (a, b) = order(l, r);
            tags.entry((a, b)).or_default().insert(tag);
        }
    }

    let mut per_record_count: BTreeMap<RecordId, usize> = BTreeMap::new();
    let mut out = Vec::new();
    for ((left, right), blocker_set) in tags {
        let left_count = *per_record_count.get(&left).unwrap_or(&0);
        let right_count = *per_record_count.get(&right).unwrap_or(&0);
        if left_count >= config.max_pairs_per_record || right_count >= config.max_pairs_per_record {
            continue;
        }
        *per_record_count.entry(left.clone()).or_insert(0) += 1;
        *per_record_count.entry(right.clone()).or_insert(0) += 1;
        out.push(CandidatePair::new(left, right, blocker_set.into_iter().collect()));
    }
    out
}

fn order(a: RecordId, b: RecordId) -> (RecordId, RecordId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Fixed function-word list elided before taking the leading title tokens.
const YEAR_TITLE_STOPWORDS: &[&str] =
    &["a", "an", "the", "of", "and", "or", "in", "on", "for", "to", "with", "from", "by", "as", "is", "are"];

fn year_title_key(r: &CanonicalRecord) -> Option<String> {
    let year = r.year?;
    let title = r.title.as_deref()?;
    let tokens: Vec<&str> = title
        .split_whitespace()
        .filter(|t| !YEAR_TITLE_STOPWORDS.contains(t))
        .collect();
    if tokens.len() < 3 {
        return None;
    }
    let prefix = tokens.iter().take(5).copied().collect::<Vec<_>>().join(" ");
    Some(format!("{year}:{prefix}"))
}

/// Bucket records by `key`, emitting every pair within each bucket with
/// more than one member. `None` keys never form a bucket.
fn block_by_key<K: Ord, F: Fn(&CanonicalRecord) -> Option<K>>(
    records: &[CanonicalRecord],
    key_fn: F,
) -> Vec<(RecordId, RecordId)> {
    let mut buckets: BTreeMap<K, Vec<RecordId>> = BTreeMap::new();
    for r in records {
        if let Some(k) = key_fn(r) {
            buckets.entry(k).or_default().push(r.id.clone());
        }
    }
    let mut out = Vec::new();
    for ids in buckets.into_values() {
        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                out.push((ids[i].clone(), ids[j].clone()));
            }
        }
    }
    out
}

mod minhash {
    use super::*;
    use rand_chacha::ChaCha20Rng;
    use rand_core::{RngCore, SeedableRng};

    const MERSENNE_61: u64 = (1u64 << 61) - 1;

    /// Deterministic `(a, b)` coefficient pairs for `num_hashes` permutations
    /// of the form `h'(x) = (a*x + b) mod MERSENNE_61`, generated from a
    /// fixed seed so two runs over the same input always agree.
    fn coefficients(params: &LshParams) -> Vec<(u64, u64)> {
        let mut rng = ChaCha20Rng::seed_from_u64(params.seed);
        (0..params.num_hashes)
            .map(|_| {
                let a = 1 + (rng.next_u64() % (MERSENNE_61 - 1));
                let b = rng.next_u64() % MERSENNE_61;
                (a, b)
            })
            .collect()
    }

    fn shingles(title: &str, k: usize) -> BTreeSet<u64> {
        let chars: Vec<char> = title.to_lowercase().chars().filter(|c| !c.is_whitespace()).collect();
        if chars.len() < k {
            if chars.is_empty() {
                return BTreeSet::new();
            }
            let s: String = chars.iter().collect();
            return [xxhash_rust::xxh3::xxh3_64(s.as_bytes())].into_iter().collect();
        }
        (0..=chars.len() - k)
            .map(|i| {
                let shingle: String = chars[i..i + k].iter().collect();
                xxhash_rust::xxh3::xxh3_64(shingle.as_bytes())
            })
            .collect()
    }

    fn signature(shingle_hashes: &BTreeSet<u64>, coeffs: &[(u64, u64)]) -> Vec<u64> {
        coeffs
            .iter()
            .map(|&(a, b)| {
                shingle_hashes
                    .iter()
                    .map(|&h| {
                        let x = h % MERSENNE_61;
                        ((a as u128 * x as u128 + b as u128) % MERSENNE_61 as u128) as u64
                    })
                    .min()
                    .unwrap_or(0)
            })
            .collect()
    }

    /// Concatenate normalized title and venue with a separator; either may
    /// be absent, but both absent yields no shingling input at all.
    fn title_venue_text(r: &CanonicalRecord) -> Option<String> {
        match (r.title.as_deref(), r.venue.as_deref()) {
            (Some(t), Some(v)) => Some(format!("{t} {v}")),
            (Some(t), None) => Some(t.to_string()),
            (None, Some(v)) => Some(v.to_string()),
            (None, None) => None,
        }
    }

    pub fn block_by_lsh(records: &[CanonicalRecord], params: &LshParams) -> Vec<(RecordId, RecordId)> {
        let coeffs = coefficients(params);
        let mut buckets: BTreeMap<(usize, u64), Vec<RecordId>> = BTreeMap::new();

        for r in records {
            let Some(text) = title_venue_text(r) else {
                continue;
            };
            let hashes = shingles(&text, params.shingle_len);
            if hashes.is_empty() {
                continue;
            }
            let sig = signature(&hashes, &coeffs);
            for band in 0..params.bands {
                let start = band * params.rows_per_band;
                let end = start + params.rows_per_band;
                let band_bytes: Vec<u8> = sig[start..end].iter().flat_map(|v| v.to_le_bytes()).collect();
                let band_hash = xxhash_rust::xxh3::xxh3_64(&band_bytes);
                buckets.entry((band, band_hash)).or_default().push(r.id.clone());
            }
        }

        let mut pairs = BTreeSet::new();
        for ids in buckets.into_values() {
            for i in 0..ids.len() {
                for j in (i + 1)..ids.len() {
                    let (a, b) = super::order(ids[i].clone(), ids[j].clone());
                    pairs.insert((a, b));
                }
            }
        }
        pairs.into_iter().collect()
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn coefficients_are_deterministic_for_same_seed() {
            let params = LshParams::default();
            assert_eq!(coefficients(&params), coefficients(&params));
        }

        #[test]
        fn near_identical_titles_land_in_a_shared_band() {
            let params = LshParams::default();
            let a = shingles("Deep Learning for Natural Language Processing", params.shingle_len);
            let b = shingles("Deep Learning for Natural Language Processing!", params.shingle_len);
            let coeffs = coefficients(&params);
            let sig_a = signature(&a, &coeffs);
            let sig_b = signature(&b, &coeffs);
            let shared = sig_a.iter().zip(sig_b.iter()).filter(|(x, y)| x == y).count();
            assert!(shared > sig_a.len() / 2, "expected majority of minhash slots to agree");
        }

        fn rec_with(id: &str, title: Option<&str>, venue: Option<&str>) -> CanonicalRecord {
            CanonicalRecord {
                id: RecordId::new(id).unwrap(),
                title: title.map(|s| s.to_string()),
                authors: Vec::new(),
                year: None,
                venue: venue.map(|s| s.to_string()),
                volume: None,
                issue: None,
                pages_start: None,
                pages_end: None,
                doi: None,
                pmid: None,
                abstract_text: None,
                record_type: dd_core::domain::RecordType::Journal,
                raw_ref: RecordId::new(id).unwrap(),
            }
        }

        #[test]
        fn null_title_with_populated_venue_still_gets_lsh_candidates() {
            let params = LshParams::default();
            let records = vec![
                rec_with("a", None, Some("Proceedings of the Deep Learning Workshop")),
                rec_with("b", None, Some("Proceedings of the Deep Learning Workshop")),
            ];
            let pairs = block_by_lsh(&records, &params);
            assert_eq!(pairs.len(), 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dd_core::domain::RecordType;

    fn rec(id: &str, doi: Option<&str>, title: Option<&str>, year: Option<i32>) -> CanonicalRecord {
        CanonicalRecord {
            id: RecordId::new(id).unwrap(),
            title: title.map(|s| s.to_string()),
            authors: Vec::new(),
            year,
            venue: None,
            volume: None,
            issue: None,
            pages_start: None,
            pages_end: None,
            doi: doi.map(|s| s.to_string()),
            pmid: None,
            abstract_text: None,
            record_type: RecordType::Journal,
            raw_ref: RecordId::new(id).unwrap(),
        }
    }

    #[test]
    fn shared_doi_produces_a_tagged_candidate() {
        let mut config = EngineConfig::default();
        config.candidate_blockers = vec![BlockerKind::Doi];
        let records = vec![
            rec("a", Some("10.1/x"), None, None),
            rec("b", Some("10.1/x"), None, None),
            rec("c", Some("10.2/y"), None, None),
        ];
        let pairs = generate_candidates(&config, &records);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].left.as_str(), "a");
        assert_eq!(pairs[0].right.as_str(), "b");
        assert!(pairs[0].blockers.contains(&BlockerTag::Doi));
    }

    #[test]
    fn max_pairs_per_record_caps_output() {
        let mut config = EngineConfig::default();
        config.candidate_blockers = vec![BlockerKind::Doi];
        config.max_pairs_per_record = 1;
        let records = vec![
            rec("a", Some("10.1/x"), None, None),
            rec("b", Some("10.1/x"), None, None),
            rec("c", Some("10.1/x"), None, None),
        ];
        let pairs = generate_candidates(&config, &records);
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn year_title_blocks_same_year_matching_five_token_prefix() {
        let mut config = EngineConfig::default();
        config.candidate_blockers = vec![BlockerKind::YearTitle];
        let records = vec![
            rec("a", None, Some("Deep Learning Methods For Large Scale Images One"), Some(2020)),
            rec("b", None, Some("Deep Learning Methods For Large Scale Images Two"), Some(2020)),
            rec("c", None, Some("Shallow Methods Here Now Totally Different"), Some(2020)),
        ];
        let pairs = generate_candidates(&config, &records);
        assert_eq!(pairs.len(), 1);
        assert_eq!((pairs[0].left.as_str(), pairs[0].right.as_str()), ("a", "b"));
    }

    #[test]
    fn year_title_skips_titles_with_fewer_than_three_stopword_filtered_tokens() {
        let mut config = EngineConfig::default();
        config.candidate_blockers = vec![BlockerKind::YearTitle];
        let records = vec![
            rec("a", None, Some("The Study Of"), Some(2020)),
            rec("b", None, Some("The Study Of"), Some(2020)),
        ];
        let pairs = generate_candidates(&config, &records);
        assert!(pairs.is_empty());
    }
}
