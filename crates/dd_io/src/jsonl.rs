//! Newline-delimited canonical JSON artifact I/O.
//!
//! Every stage artifact is one canonical JSON value per line, LF-terminated,
//! with a single trailing newline and no blank lines — the line order *is*
//! the stage's deterministic sort order; this module never reorders what
//! it's given.

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::canonical_json::to_canonical_json_bytes;
use crate::IoError;

/// Write `items` as canonical JSONL to `path`, atomically (temp file in the
/// same directory, fsync, rename — mirrors `canonical_json::write_canonical_file`).
pub fn write_jsonl_atomic<T: Serialize>(path: &Path, items: &[T]) -> Result<(), IoError> {
    let mut body = Vec::with_capacity(items.len() * 128);
    for item in items {
        let value = serde_json::to_value(item)?;
        body.extend_from_slice(&to_canonical_json_bytes(&value));
        body.push(b'\n');
    }

    let parent = path
        .parent()
        .ok_or_else(|| IoError::Path("path has no parent".into()))?;
    fs::create_dir_all(parent)?;

    let tmp = make_unique_tmp_path(path);
    {
        let mut tf = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp)?;
        tf.write_all(&body)?;
        tf.sync_all()?;
    }

    match fs::rename(&tmp, path) {
        Ok(()) => {
            let _ = fsync_dir(parent);
            Ok(())
        }
        Err(_) => {
            let res: std::io::Result<()> = (|| {
                let mut f = OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .open(path)?;
                f.write_all(&body)?;
                f.sync_all()
            })();
            let _ = fs::remove_file(&tmp);
            res?;
            let _ = fsync_dir(parent);
            Ok(())
        }
    }
}

/// Read a canonical JSONL artifact back into typed items, one per line.
/// Blank trailing lines are tolerated; any other empty line is an error.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, IoError> {
    let f = std::fs::File::open(path)?;
    let reader = BufReader::new(f);
    let mut out = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let item: T = serde_json::from_str(&line).map_err(|e| IoError::Json {
            pointer: alloc_line_pointer(lineno),
            msg: e.to_string(),
        })?;
        out.push(item);
    }
    Ok(out)
}

fn alloc_line_pointer(lineno: usize) -> String {
    format!("/line/{lineno}")
}

fn make_unique_tmp_path(target: &Path) -> std::path::PathBuf {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let pid = std::process::id();
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let fname = target
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("file");
    let tmp_name = format!("{fname}.{pid}.{n}.tmp");
    match target.parent() {
        Some(dir) => dir.join(tmp_name),
        None => std::path::PathBuf::from(tmp_name),
    }
}

#[cfg(unix)]
fn fsync_dir(dir: &Path) -> std::io::Result<()> {
    let df = OpenOptions::new().read(true).open(dir)?;
    df.sync_all()
}

#[cfg(not(unix))]
fn fsync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Row {
        b: i32,
        a: i32,
    }

    #[test]
    fn round_trips_and_sorts_keys_in_each_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.jsonl");
        let rows = vec![Row { b: 1, a: 2 }, Row { b: 3, a: 4 }];
        write_jsonl_atomic(&path, &rows).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with(r#"{"a":2,"b":1}"#));
        assert!(text.ends_with('\n'));
        assert_eq!(text.matches('\n').count(), 2);

        let back: Vec<Row> = read_jsonl(&path).unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn empty_items_produces_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.jsonl");
        write_jsonl_atomic::<Row>(&path, &[]).unwrap();
        let back: Vec<Row> = read_jsonl(&path).unwrap();
        assert!(back.is_empty());
    }
}
