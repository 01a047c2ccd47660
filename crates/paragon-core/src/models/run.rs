//! Per-run bookkeeping types: stages, outcomes, log entries.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Pipeline stage a file is in. A file advances through all four stages in
/// order; any stage can fail terminally for that file within the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// OCR / embedded-text extraction.
    Extracting,
    /// LLM structuring and schema validation.
    Parsing,
    /// Spreadsheet append.
    Writing,
    /// Move to the archive folder.
    Archiving,
}

impl Stage {
    /// Whether a failure at this stage means the file itself is unusable and
    /// should be quarantined rather than retried on the next run.
    pub fn is_file_fault(self) -> bool {
        matches!(self, Stage::Extracting | Stage::Parsing)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Extracting => "extract",
            Stage::Parsing => "parse",
            Stage::Writing => "write",
            Stage::Archiving => "archive",
        };
        f.write_str(name)
    }
}

/// Outcome of one file within one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// All stages completed; the file is archived.
    Succeeded {
        /// Identifier written to the spreadsheet rows.
        receipt_id: String,
    },
    /// A stage failed; later stages did not run.
    Failed {
        /// Stage that failed.
        stage: Stage,
        /// Human-readable failure reason.
        reason: String,
    },
}

/// One line of the run log: a file attempt and how it ended.
#[derive(Debug, Clone)]
pub struct RunEntry {
    /// When the attempt finished.
    pub timestamp: DateTime<Local>,
    /// Source file identifier.
    pub file: String,
    /// How the attempt ended.
    pub outcome: RunOutcome,
}

/// Aggregate counts for one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Files attempted.
    pub attempted: usize,
    /// Files fully processed and archived.
    pub succeeded: usize,
    /// Files that failed at some stage.
    pub failed: usize,
}
