//! Core library for the paragon receipt pipeline.
//!
//! This crate provides:
//! - The watched-folder store (pending / archive / quarantine moves)
//! - Text extraction via embedded PDF text or a remote document-OCR service
//! - LLM structuring of receipt text into validated expense records
//! - Deterministic price-with-tax computation
//! - Spreadsheet row mapping and the append client
//! - The sequential per-file pipeline and its run log

pub mod error;
pub mod models;
pub mod ocr;
pub mod pipeline;
pub mod runlog;
pub mod sheets;
pub mod store;
pub mod structure;
pub mod tax;

pub use error::{ParagonError, Result};
pub use models::config::{Credentials, PipelineConfig};
pub use models::receipt::{Receipt, ReceiptItem};
pub use models::run::{RunEntry, RunOutcome, RunSummary, Stage};
pub use ocr::{RemoteOcr, TextExtractor};
pub use pipeline::{FileReport, Pipeline};
pub use runlog::{FileRunLogger, RunLogger};
pub use sheets::{SheetWriter, SheetsClient};
pub use store::{FileKind, LocalFolderStore, ReceiptStore, StoredFile};
pub use structure::{ChatClient, LlmParser, OpenAiClient, RecordParser};
