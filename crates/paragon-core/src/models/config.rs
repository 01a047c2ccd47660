//! Configuration structures for the receipt pipeline.

use std::path::PathBuf;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::SetupError;

/// Main configuration for the paragon pipeline.
///
/// Built once at startup and passed by reference into each component.
/// Credentials are deliberately not part of this file; see [`Credentials`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Source/archive folder configuration.
    pub storage: StorageConfig,

    /// OCR service configuration.
    pub ocr: OcrConfig,

    /// Language-model service configuration.
    pub llm: LlmConfig,

    /// Spreadsheet destination configuration.
    pub sheets: SheetsConfig,

    /// Category vocabulary configuration.
    pub categories: CategoryConfig,

    /// Tax computation configuration.
    pub tax: TaxConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            ocr: OcrConfig::default(),
            llm: LlmConfig::default(),
            sheets: SheetsConfig::default(),
            categories: CategoryConfig::default(),
            tax: TaxConfig::default(),
        }
    }
}

/// Watched-folder layout.
///
/// Processed files are moved into `archive_subdir`; files that fail OCR or
/// parsing are moved into `error_subdir`. Files that fail at the spreadsheet
/// or archive stage stay in the source folder and are retried on the next
/// run, so duplicate spreadsheet rows are possible after a partial failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Folder watched for new receipt files.
    pub source_dir: PathBuf,

    /// Subfolder of `source_dir` that processed files are moved into.
    pub archive_subdir: String,

    /// Subfolder of `source_dir` that unprocessable files are moved into.
    pub error_subdir: String,

    /// Run-log file name inside `source_dir`, excluded from listings.
    pub log_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("receipts"),
            archive_subdir: "archive".to_string(),
            error_subdir: "errors".to_string(),
            log_file: "run_log.txt".to_string(),
        }
    }
}

/// Document-OCR service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Service endpoint, e.g. `https://my-resource.cognitiveservices.azure.com`.
    pub endpoint: String,

    /// API version query parameter.
    pub api_version: String,

    /// HTTP timeout per request, in seconds.
    pub timeout_secs: u64,

    /// Seconds between polls of the analyze operation.
    pub poll_interval_secs: u64,

    /// Maximum number of polls before giving up.
    pub poll_attempts: u32,

    /// Use embedded PDF text instead of OCR when a PDF has enough of it.
    pub prefer_embedded_text: bool,

    /// Minimum embedded text length to consider a PDF text-based.
    pub min_text_length: usize,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_version: "2024-11-30".to_string(),
            timeout_secs: 120,
            poll_interval_secs: 2,
            poll_attempts: 60,
            prefer_embedded_text: true,
            min_text_length: 50,
        }
    }
}

/// Language-model service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Chat-completions endpoint base, e.g. `https://api.openai.com`.
    pub endpoint: String,

    /// Models to try, in order. The next one is attempted when a request or
    /// its response fails.
    pub models: Vec<String>,

    /// Sampling temperature.
    pub temperature: f32,

    /// Completion token budget.
    pub max_tokens: u32,

    /// HTTP timeout per request, in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com".to_string(),
            models: vec!["gpt-4o".to_string(), "gpt-4o-mini".to_string()],
            temperature: 0.0,
            max_tokens: 1200,
            timeout_secs: 120,
        }
    }
}

/// Spreadsheet destination configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetsConfig {
    /// Target spreadsheet identifier.
    pub spreadsheet_id: String,

    /// A1 range receiving one summary row per receipt.
    pub summary_range: String,

    /// A1 range receiving one row per line item.
    pub items_range: String,

    /// HTTP timeout per request, in seconds.
    pub timeout_secs: u64,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            summary_range: "Summary!A:D".to_string(),
            items_range: "Items!A:H".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Expense category vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryConfig {
    /// Allowed categories, offered verbatim to the model.
    pub vocabulary: Vec<String>,

    /// Category assigned when the model returns one outside the vocabulary.
    /// Must itself be a member of the vocabulary.
    pub fallback: String,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            vocabulary: [
                "Groceries",
                "Dining Out",
                "Transportation",
                "Housing",
                "Utilities",
                "Health",
                "Entertainment",
                "Clothing",
                "Travel",
                "Gifts/Charity",
                "Other",
                "General Merchandise",
                "Auto repair",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            fallback: "Other".to_string(),
        }
    }
}

/// Sales-tax computation.
///
/// `price_with_tax = price * (1 + rate)` for taxable items, rounded half-up
/// to two decimal places. Non-taxable items pass through unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxConfig {
    /// Applicable sales-tax rate as a fraction, e.g. 0.08 for 8%.
    pub rate: Decimal,
}

impl Default for TaxConfig {
    fn default() -> Self {
        Self {
            rate: Decimal::ZERO,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> std::result::Result<Self, SetupError> {
        let content = std::fs::read_to_string(path).map_err(|e| SetupError::ConfigFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| SetupError::ConfigFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> std::io::Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }

    /// Check that the configuration is complete enough to run the pipeline.
    pub fn validate(&self) -> std::result::Result<(), SetupError> {
        if self.ocr.endpoint.trim().is_empty() {
            return Err(SetupError::InvalidConfig(
                "ocr.endpoint is not set".to_string(),
            ));
        }
        if self.llm.models.is_empty() {
            return Err(SetupError::InvalidConfig(
                "llm.models must list at least one model".to_string(),
            ));
        }
        if self.sheets.spreadsheet_id.trim().is_empty() {
            return Err(SetupError::InvalidConfig(
                "sheets.spreadsheet_id is not set".to_string(),
            ));
        }
        if self.categories.vocabulary.is_empty() {
            return Err(SetupError::InvalidConfig(
                "categories.vocabulary must not be empty".to_string(),
            ));
        }
        if !self
            .categories
            .vocabulary
            .iter()
            .any(|c| c == &self.categories.fallback)
        {
            return Err(SetupError::InvalidConfig(format!(
                "categories.fallback {:?} is not in the vocabulary",
                self.categories.fallback
            )));
        }
        if self.tax.rate < Decimal::ZERO || self.tax.rate >= Decimal::ONE {
            return Err(SetupError::InvalidConfig(format!(
                "tax.rate {} is outside [0, 1)",
                self.tax.rate
            )));
        }
        Ok(())
    }
}

/// Per-service credentials, read from the environment at startup.
///
/// A `.env` file in the working directory is honored when the caller loads
/// it before constructing this (the CLI does).
#[derive(Clone)]
pub struct Credentials {
    /// OCR service subscription key.
    pub ocr_key: String,

    /// Language-model service API key.
    pub llm_key: String,

    /// Spreadsheet service OAuth bearer token.
    pub sheets_token: String,
}

/// Environment variable holding the OCR subscription key.
pub const OCR_KEY_VAR: &str = "PARAGON_OCR_KEY";
/// Environment variable holding the language-model API key.
pub const LLM_KEY_VAR: &str = "OPENAI_API_KEY";
/// Environment variable holding the spreadsheet bearer token.
pub const SHEETS_TOKEN_VAR: &str = "PARAGON_SHEETS_TOKEN";

impl Credentials {
    /// Read all credentials, failing on the first one missing.
    pub fn from_env() -> std::result::Result<Self, SetupError> {
        Ok(Self {
            ocr_key: require(OCR_KEY_VAR)?,
            llm_key: require(LLM_KEY_VAR)?,
            sheets_token: require(SHEETS_TOKEN_VAR)?,
        })
    }
}

fn require(var: &'static str) -> std::result::Result<String, SetupError> {
    match std::env::var(var) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(SetupError::MissingCredential(var)),
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("ocr_key", &"<redacted>")
            .field("llm_key", &"<redacted>")
            .field("sheets_token", &"<redacted>")
            .finish()
    }
}
