//! Append-only run log: one line per attempted file.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use crate::error::LogError;
use crate::models::run::{RunEntry, RunOutcome};

/// Result type for run-log operations.
pub type Result<T> = std::result::Result<T, LogError>;

/// Sink for per-file outcome records. Purely observational: the pipeline
/// never changes behavior based on it.
pub trait RunLogger {
    /// Append one entry.
    fn append(&self, entry: &RunEntry) -> Result<()>;
}

/// Writes entries as timestamped lines to a text file.
pub struct FileRunLogger {
    path: PathBuf,
}

impl FileRunLogger {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

/// One log line, without the trailing newline.
pub fn format_entry(entry: &RunEntry) -> String {
    let stamp = entry.timestamp.format("[%Y-%m-%d %H:%M:%S]");
    match &entry.outcome {
        RunOutcome::Succeeded { receipt_id } => {
            format!("{stamp} ok {} -> {receipt_id}", entry.file)
        }
        RunOutcome::Failed { stage, reason } => {
            format!("{stamp} failed {} at {stage}: {reason}", entry.file)
        }
    }
}

impl RunLogger for FileRunLogger {
    fn append(&self, entry: &RunEntry) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| LogError::Append {
                path: self.path.clone(),
                source: e,
            })?;
        writeln!(file, "{}", format_entry(entry)).map_err(|e| LogError::Append {
            path: self.path.clone(),
            source: e,
        })
    }
}
