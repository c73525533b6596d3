//! Append-only persistence for measurement records.
//!
//! Two sinks: a JSONL file with one serialized record per line (samples and
//! the final summary envelope) and a human-readable log with one line per
//! sample. Both are append-only so repeated runs accumulate history.

pub mod model;

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Owns the JSONL and log paths and appends records to them.
pub struct RecordStore {
    jsonl_path: PathBuf,
    log_path: PathBuf,
}

impl RecordStore {
    pub fn new(jsonl_path: impl Into<PathBuf>, log_path: impl Into<PathBuf>) -> Self {
        Self {
            jsonl_path: jsonl_path.into(),
            log_path: log_path.into(),
        }
    }

    pub fn jsonl_path(&self) -> &Path {
        &self.jsonl_path
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Serializes `record` as one JSON line and appends it to the JSONL file.
    pub fn append_record<T: Serialize>(&self, record: &T) -> io::Result<()> {
        let line = serde_json::to_string(record).map_err(io::Error::other)?;
        append_line(&self.jsonl_path, &line)
    }

    /// Appends one trimmed line to the human-readable log.
    pub fn append_log_line(&self, line: &str) -> io::Result<()> {
        append_line(&self.log_path, line.trim_end())
    }
}

fn append_line(path: &Path, line: &str) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", line)
}
