// crates/dd_cli/src/args.rs
//
// Deterministic, offline CLI argument parsing & validation.
// - Input is a JSONL file of `RawRecord`s; output is a directory of stage
//   artifacts plus a run summary printed to stdout.
// - Config overrides map 1:1 onto `dd_core::config::EngineConfig` fields;
//   anything left unset keeps the engine default.

use std::path::PathBuf;

use clap::Parser;
use dd_core::config::{BlockerKind, EngineConfig, LshParams};

#[derive(Debug, Parser)]
#[command(name = "dedupe", about = "Deterministic bibliographic record deduplication")]
pub struct Args {
    /// Path to a JSONL file of `RawRecord`s.
    #[arg(long)]
    pub input: PathBuf,

    /// Directory to write stage artifacts into (created if missing).
    #[arg(long, default_value = ".")]
    pub out: PathBuf,

    /// Path to a calibration JSON file. Defaults to the embedded calibration.
    #[arg(long)]
    pub calibration: Option<PathBuf>,

    /// Target false-positive rate used to derive `t_high` (default 0.01).
    #[arg(long)]
    pub fpr_alpha: Option<f64>,

    /// Score floor below which a pair is always `auto_non_match`.
    #[arg(long)]
    pub t_low: Option<f64>,

    /// Explicit `t_high` override, bypassing FPR-budget derivation.
    #[arg(long)]
    pub t_high: Option<f64>,

    /// Candidate blockers to run, comma-separated (doi, pmid, year_title, lsh).
    #[arg(long, value_delimiter = ',')]
    pub blockers: Option<Vec<String>>,

    /// Hard cap on candidate pairs generated per record across all blockers.
    #[arg(long)]
    pub max_pairs_per_record: Option<usize>,

    /// Per-field weight substituted for a missing field in Fellegi-Sunter
    /// aggregation.
    #[arg(long)]
    pub missing_weight: Option<f64>,

    /// MinHash shingle length.
    #[arg(long)]
    pub lsh_shingle_len: Option<usize>,

    /// MinHash permutation count. Must satisfy `bands * rows_per_band`.
    #[arg(long)]
    pub lsh_num_hashes: Option<usize>,

    /// LSH band count.
    #[arg(long)]
    pub lsh_bands: Option<usize>,

    /// LSH rows per band.
    #[arg(long)]
    pub lsh_rows_per_band: Option<usize>,

    /// Suppress the human-readable completion line.
    #[arg(long)]
    pub quiet: bool,
}

#[derive(Debug)]
pub enum CliError {
    BadBlocker(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::BadBlocker(s) => write!(f, "unknown blocker: {s}"),
        }
    }
}
impl std::error::Error for CliError {}

/// Parse `argv`. Clap handles shape (required `--input`, numeric parsing);
/// semantic validation of the resulting `EngineConfig` happens once inside
/// `dd_pipeline::run_pipeline`, not here.
pub fn parse_and_validate() -> Result<Args, clap::Error> {
    Args::try_parse()
}

/// Fold CLI overrides onto `EngineConfig::default()`. Validation of the
/// resulting config is the engine's job (`EngineConfig::validate`), not
/// this function's.
pub fn build_config(args: &Args) -> Result<EngineConfig, CliError> {
    let mut config = EngineConfig::default();

    if let Some(v) = args.fpr_alpha {
        config.fpr_alpha = v;
    }
    if let Some(v) = args.t_low {
        config.t_low = v;
    }
    if args.t_high.is_some() {
        config.t_high_override = args.t_high;
    }
    if let Some(names) = &args.blockers {
        config.candidate_blockers = names
            .iter()
            .map(|name| parse_blocker(name))
            .collect::<Result<Vec<_>, _>>()?;
    }
    if let Some(v) = args.max_pairs_per_record {
        config.max_pairs_per_record = v;
    }
    if let Some(v) = args.missing_weight {
        config.missing_weight = v;
    }

    let mut lsh = LshParams::default();
    if let Some(v) = args.lsh_shingle_len {
        lsh.shingle_len = v;
    }
    if let Some(v) = args.lsh_num_hashes {
        lsh.num_hashes = v;
    }
    if let Some(v) = args.lsh_bands {
        lsh.bands = v;
    }
    if let Some(v) = args.lsh_rows_per_band {
        lsh.rows_per_band = v;
    }
    config.lsh = lsh;

    Ok(config)
}

fn parse_blocker(name: &str) -> Result<BlockerKind, CliError> {
    match name.trim() {
        "doi" => Ok(BlockerKind::Doi),
        "pmid" => Ok(BlockerKind::Pmid),
        "year_title" => Ok(BlockerKind::YearTitle),
        "lsh" => Ok(BlockerKind::Lsh),
        other => Err(CliError::BadBlocker(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_blockers() {
        assert_eq!(parse_blocker("doi").unwrap(), BlockerKind::Doi);
        assert_eq!(parse_blocker("lsh").unwrap(), BlockerKind::Lsh);
    }

    #[test]
    fn rejects_unknown_blocker() {
        assert!(parse_blocker("bogus").is_err());
    }

    #[test]
    fn default_args_build_default_config() {
        let args = Args {
            input: PathBuf::from("in.jsonl"),
            out: PathBuf::from("."),
            calibration: None,
            fpr_alpha: None,
            t_low: None,
            t_high: None,
            blockers: None,
            max_pairs_per_record: None,
            missing_weight: None,
            lsh_shingle_len: None,
            lsh_num_hashes: None,
            lsh_bands: None,
            lsh_rows_per_band: None,
            quiet: false,
        };
        let config = build_config(&args).unwrap();
        assert_eq!(config, EngineConfig::default());
    }
}
