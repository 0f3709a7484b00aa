//! End-to-end tests for the `dedupe` binary itself: argument parsing,
//! exit codes, and the artifacts it leaves on disk, exercised exactly as a
//! shell caller would invoke it.

use assert_cmd::Command;
use predicates::prelude::*;

fn write_input(dir: &std::path::Path, lines: &[&str]) -> std::path::PathBuf {
    let path = dir.join("input.jsonl");
    std::fs::write(&path, lines.join("\n")).unwrap();
    path
}

#[test]
fn missing_required_input_flag_exits_nonzero() {
    Command::cargo_bin("dedupe")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("input"));
}

#[test]
fn unknown_blocker_name_is_rejected_before_any_artifact_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(&dir, &[]);

    Command::cargo_bin("dedupe")
        .unwrap()
        .arg("--input")
        .arg(&input)
        .arg("--out")
        .arg(dir.path())
        .arg("--blockers")
        .arg("not_a_real_blocker")
        .assert()
        .failure();

    assert!(std::fs::read_dir(dir.path()).unwrap().all(|e| {
        e.unwrap().file_name() != "stage1"
    }));
}

#[test]
fn empty_input_runs_successfully_and_prints_zero_count_summary() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(&dir, &[]);

    Command::cargo_bin("dedupe")
        .unwrap()
        .arg("--input")
        .arg(&input)
        .arg("--out")
        .arg(dir.path())
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_records\": 0"))
        .stdout(predicate::str::contains("\"success\": true"));

    assert!(dir.path().join("stage1/canonical_records.jsonl").exists());
    assert!(dir.path().join("artifacts/merged_records.jsonl").exists());
}

#[test]
fn shared_doi_records_produce_one_auto_match() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        &dir,
        &[
            r#"{"id":"a","source_file":"f.ris","source_byte_offset":0,"fields":[["TI","Deep Learning"],["DO","10.1000/shared"]]}"#,
            r#"{"id":"b","source_file":"f.ris","source_byte_offset":1,"fields":[["TI","Deep Learning"],["DO","10.1000/shared"]]}"#,
        ],
    );

    Command::cargo_bin("dedupe")
        .unwrap()
        .arg("--input")
        .arg(&input)
        .arg("--out")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_duplicates_auto\": 1"));
}

#[test]
fn nonexistent_input_path_fails_with_error_summary_on_stdout() {
    let dir = tempfile::tempdir().unwrap();

    Command::cargo_bin("dedupe")
        .unwrap()
        .arg("--input")
        .arg(dir.path().join("does_not_exist.jsonl"))
        .arg("--out")
        .arg(dir.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"success\": false"));
}
