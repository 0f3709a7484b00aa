// crates/dd_cli/src/main.rs
//
// dedupe — CLI entrypoint for the bibliographic deduplication engine.
// Drives the fixed six-stage pipeline end-to-end, writes canonical JSONL
// artifacts, and prints the run summary as JSON.
// Strictly offline & deterministic: no network, no OS RNG.

mod args;

use std::process::ExitCode;

use args::{build_config, parse_and_validate};
use dd_io::calibration::Calibration;
use dd_pipeline::run_pipeline;

fn main() -> ExitCode {
    let args = match parse_and_validate() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("dedupe: error: {e}");
            return ExitCode::from(2);
        }
    };

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("dedupe: error: {e}");
            print_failure_summary(&e);
            ExitCode::from(1)
        }
    }
}

fn run(args: &args::Args) -> Result<ExitCode, String> {
    let config = build_config(args).map_err(|e| e.to_string())?;

    let calibration = match &args.calibration {
        Some(path) => Calibration::from_path(path).map_err(|e| e.to_string())?,
        None => Calibration::default_embedded().map_err(|e| e.to_string())?,
    };

    let raw_records = dd_io::jsonl::read_jsonl(&args.input).map_err(|e| e.to_string())?;

    let summary = run_pipeline(&config, &calibration, &raw_records, &args.out)
        .map_err(|e| e.to_string())?;

    print_summary(&summary);

    if !args.quiet {
        eprintln!(
            "dedupe: {} records, {} candidates, {} auto-matches, {} for review",
            summary.total_records,
            summary.total_candidates,
            summary.total_duplicates_auto,
            summary.total_review_pairs
        );
        eprintln!("dedupe: artifacts written to {}", args.out.display());
    }

    Ok(ExitCode::from(0))
}

fn print_summary(summary: &dd_pipeline::RunSummary) {
    match serde_json::to_string_pretty(summary) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("dedupe: warning: cannot serialize summary: {e}"),
    }
}

/// On failure, still emit a summary shaped like the success path so callers
/// that always parse stdout as JSON don't need a separate error path.
fn print_failure_summary(message: &str) {
    let failure = serde_json::json!({
        "success": false,
        "total_records": 0,
        "total_candidates": 0,
        "total_duplicates_auto": 0,
        "total_review_pairs": 0,
        "output_files": {},
        "error_message": message,
    });
    println!("{failure}");
}
