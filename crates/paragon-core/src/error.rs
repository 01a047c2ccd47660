//! Error types for the paragon-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the paragon library.
#[derive(Error, Debug)]
pub enum ParagonError {
    /// Fatal configuration/credential error, raised before any file is touched.
    #[error("setup error: {0}")]
    Setup(#[from] SetupError),

    /// Source folder / archive error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Text extraction (OCR) error.
    #[error("extraction error: {0}")]
    Extract(#[from] ExtractError),

    /// Structured parsing (LLM) error.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Spreadsheet append error.
    #[error("write error: {0}")]
    Write(#[from] WriteError),

    /// Run-log append error.
    #[error("log error: {0}")]
    Log(#[from] LogError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that abort the run before any file is processed.
#[derive(Error, Debug)]
pub enum SetupError {
    /// A required environment variable is not set.
    #[error("missing credential: {0} is not set")]
    MissingCredential(&'static str),

    /// The configuration file could not be read or parsed.
    #[error("failed to load config from {path}: {reason}")]
    ConfigFile { path: PathBuf, reason: String },

    /// A configuration value is missing or out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors from the source/archive folder boundary.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Listing the source folder failed.
    #[error("failed to list {path}: {source}")]
    List {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Reading a file's bytes failed.
    #[error("failed to read {file}: {source}")]
    Read {
        file: String,
        source: std::io::Error,
    },

    /// Moving a file failed.
    #[error("failed to move {file} to {dest}: {source}")]
    Move {
        file: String,
        dest: PathBuf,
        source: std::io::Error,
    },
}

/// Errors from the OCR boundary.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Transport-level failure talking to the OCR service.
    #[error("OCR request failed: {0}")]
    Http(String),

    /// The OCR service rejected the request.
    #[error("OCR service returned {status}: {body}")]
    Service { status: u16, body: String },

    /// The analyze operation reported failure.
    #[error("OCR analysis failed: {0}")]
    Analysis(String),

    /// The analyze operation never completed within the poll budget.
    #[error("OCR analysis timed out after {attempts} polls")]
    Timeout { attempts: u32 },

    /// The service response was missing an expected field.
    #[error("unexpected OCR response: {0}")]
    Malformed(String),

    /// A PDF could not be decoded for embedded text.
    #[error("failed to read PDF text: {0}")]
    Pdf(String),

    /// No text came back for the file.
    #[error("no text extracted")]
    Empty,
}

/// Errors from the language-model boundary and response validation.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Transport-level failure talking to the model service.
    #[error("model request failed: {0}")]
    Http(String),

    /// The model service rejected the request.
    #[error("model service returned {status}: {body}")]
    Service { status: u16, body: String },

    /// The service response itself was missing an expected field.
    #[error("unexpected model response: {0}")]
    Malformed(String),

    /// The reply contained no JSON object.
    #[error("no JSON object found in model reply")]
    NoJson,

    /// The JSON did not match the receipt schema.
    #[error("reply does not match receipt schema: {0}")]
    Schema(String),

    /// The purchase date was missing or not YYYY-MM-DD.
    #[error("invalid purchase date: {0:?}")]
    InvalidDate(String),

    /// An item price was not a finite number.
    #[error("invalid price for item {item:?}: {value}")]
    InvalidPrice { item: String, value: f64 },

    /// Every configured model failed; carries the last error.
    #[error("all model attempts failed, last error: {0}")]
    AllModelsFailed(Box<ParseError>),
}

/// Errors from the spreadsheet boundary.
#[derive(Error, Debug)]
pub enum WriteError {
    /// Transport-level failure talking to the spreadsheet service.
    #[error("spreadsheet request failed: {0}")]
    Http(String),

    /// The spreadsheet service rejected the append.
    #[error("spreadsheet service returned {status} for {range}: {body}")]
    Service {
        status: u16,
        range: String,
        body: String,
    },
}

/// Errors from the run-log sink.
#[derive(Error, Debug)]
pub enum LogError {
    /// Appending to the log failed.
    #[error("failed to append to {path}: {source}")]
    Append {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type for the paragon library.
pub type Result<T> = std::result::Result<T, ParagonError>;
