//! The per-file stage sequence and the run loop around it.

use std::time::Instant;

use chrono::Local;
use tracing::{info, warn};

use crate::error::Result;
use crate::models::receipt::Receipt;
use crate::models::run::{RunEntry, RunOutcome, RunSummary, Stage};
use crate::ocr::TextExtractor;
use crate::runlog::RunLogger;
use crate::sheets::SheetWriter;
use crate::store::{ReceiptStore, StoredFile};
use crate::structure::RecordParser;

/// A stage failure for one file. Later stages do not run.
struct StageFailure {
    stage: Stage,
    reason: String,
}

impl StageFailure {
    fn new(stage: Stage, error: impl std::fmt::Display) -> Self {
        Self {
            stage,
            reason: error.to_string(),
        }
    }
}

/// What happened to one file in this run.
pub struct FileReport {
    /// The attempted file.
    pub file: StoredFile,
    /// The structured record, when parsing got that far. Present even if a
    /// later stage failed.
    pub receipt: Option<Receipt>,
    /// Terminal state of the file within this run.
    pub outcome: RunOutcome,
    /// Wall-clock processing time.
    pub duration_ms: u64,
}

impl FileReport {
    /// Whether all stages completed.
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, RunOutcome::Succeeded { .. })
    }
}

/// Drives extract -> parse -> write -> archive for every pending file,
/// sequentially, converting per-file errors into run-log entries.
pub struct Pipeline<'a> {
    store: &'a dyn ReceiptStore,
    extractor: &'a dyn TextExtractor,
    parser: &'a dyn RecordParser,
    writer: &'a dyn SheetWriter,
    logger: &'a dyn RunLogger,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        store: &'a dyn ReceiptStore,
        extractor: &'a dyn TextExtractor,
        parser: &'a dyn RecordParser,
        writer: &'a dyn SheetWriter,
        logger: &'a dyn RunLogger,
    ) -> Self {
        Self {
            store,
            extractor,
            parser,
            writer,
            logger,
        }
    }

    /// Files waiting in the source folder. A listing failure is fatal: it
    /// means the source boundary itself is broken, not one file.
    pub fn list_pending(&self) -> Result<Vec<StoredFile>> {
        Ok(self.store.list_pending()?)
    }

    /// Process every pending file, one at a time. Per-file failures are
    /// logged and skipped; they never abort the run.
    pub fn run(&self) -> Result<RunSummary> {
        let files = self.list_pending()?;
        let mut summary = RunSummary::default();

        for file in &files {
            let report = self.process_and_log(file);
            summary.attempted += 1;
            if report.succeeded() {
                summary.succeeded += 1;
            } else {
                summary.failed += 1;
            }
        }

        Ok(summary)
    }

    /// The per-file error boundary: run the stages, quarantine unreadable
    /// files, append exactly one run-log entry, never propagate.
    pub fn process_and_log(&self, file: &StoredFile) -> FileReport {
        let start = Instant::now();

        let (receipt, outcome) = match self.process_file(file) {
            Ok(receipt) => {
                info!("processed {} -> archived", file.id);
                let outcome = RunOutcome::Succeeded {
                    receipt_id: receipt.receipt_id.clone(),
                };
                (Some(receipt), outcome)
            }
            Err(failure) => {
                warn!("{} failed at {}: {}", file.id, failure.stage, failure.reason);
                if failure.stage.is_file_fault() {
                    // The file itself is unreadable or unparsable; park it so
                    // it is not retried forever.
                    if let Err(e) = self.store.quarantine(file) {
                        warn!("could not quarantine {}: {}", file.id, e);
                    }
                }
                let outcome = RunOutcome::Failed {
                    stage: failure.stage,
                    reason: failure.reason,
                };
                (None, outcome)
            }
        };

        let entry = RunEntry {
            timestamp: Local::now(),
            file: file.id.clone(),
            outcome: outcome.clone(),
        };
        if let Err(e) = self.logger.append(&entry) {
            // The run log is observational; a broken sink must not change
            // the file's outcome.
            warn!("run-log append failed for {}: {}", file.id, e);
        }

        FileReport {
            file: file.clone(),
            receipt,
            outcome,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// The stage sequence. Archiving only happens after a successful append.
    fn process_file(&self, file: &StoredFile) -> std::result::Result<Receipt, StageFailure> {
        let bytes = self
            .store
            .read(file)
            .map_err(|e| StageFailure::new(Stage::Extracting, e))?;

        let text = self
            .extractor
            .extract(&bytes, file.kind)
            .map_err(|e| StageFailure::new(Stage::Extracting, e))?;

        let receipt = self
            .parser
            .parse(&file.id, &text)
            .map_err(|e| StageFailure::new(Stage::Parsing, e))?;

        self.writer
            .append(&receipt)
            .map_err(|e| StageFailure::new(Stage::Writing, e))?;

        self.store
            .archive(file)
            .map_err(|e| StageFailure::new(Stage::Archiving, e))?;

        Ok(receipt)
    }
}
