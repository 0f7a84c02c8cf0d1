//! JSONL scanning and writing.
//!
//! Per-line failures are local: a malformed line is skipped, counted and
//! logged, never fatal to the scan. Only an unreadable file aborts.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use super::{Question, RecordError};

/// Result of scanning a JSONL file: parsed records plus the count of
/// malformed lines that were skipped.
#[derive(Debug)]
pub struct ScanOutcome<T> {
    pub records: Vec<T>,
    pub skipped: usize,
}

impl<T> ScanOutcome<T> {
    #[inline]
    pub fn total_lines(&self) -> usize {
        self.records.len() + self.skipped
    }
}

/// Reads one record per line from `path`, skipping malformed lines.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<ScanOutcome<T>, RecordError> {
    let file = File::open(path).map_err(|source| RecordError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|source| RecordError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match serde_json::from_str::<T>(trimmed) {
            Ok(record) => records.push(record),
            Err(e) => {
                skipped += 1;
                warn!(
                    path = %path.display(),
                    line = line_no + 1,
                    error = %e,
                    "skipping malformed record"
                );
            }
        }
    }

    Ok(ScanOutcome { records, skipped })
}

/// Writes one record per line to `path`, creating parent directories.
pub fn write_jsonl<T: Serialize>(path: &Path, records: &[T]) -> Result<(), RecordError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| RecordError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }

    let file = File::create(path).map_err(|source| RecordError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);

    for record in records {
        let line = serde_json::to_string(record)?;
        writer
            .write_all(line.as_bytes())
            .and_then(|_| writer.write_all(b"\n"))
            .map_err(|source| RecordError::Write {
                path: path.to_path_buf(),
                source,
            })?;
    }

    writer.flush().map_err(|source| RecordError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads a reference file into an id → [`Question`] map.
///
/// Returns the map plus the malformed-line count. Duplicate ids keep the
/// last occurrence, matching a plain rescan of the file.
pub fn load_references(path: &Path) -> Result<(HashMap<String, Question>, usize), RecordError> {
    let outcome: ScanOutcome<Question> = read_jsonl(path)?;
    let skipped = outcome.skipped;

    let mut references = HashMap::with_capacity(outcome.records.len());
    for question in outcome.records {
        references.insert(question.id.clone(), question);
    }

    Ok((references, skipped))
}
