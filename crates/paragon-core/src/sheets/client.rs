//! HTTP append client for a Google-Sheets-style values API.

use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::error::{SetupError, WriteError};
use crate::models::config::SheetsConfig;
use crate::models::receipt::Receipt;

use super::{Result, SheetWriter, item_rows, summary_row};

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";

/// Appends rows through the `values:append` endpoint with a bearer token.
pub struct SheetsClient {
    base_url: String,
    spreadsheet_id: String,
    summary_range: String,
    items_range: String,
    token: String,
    client: reqwest::blocking::Client,
}

/// Request body for `values:append`.
#[derive(Serialize)]
struct AppendRequest {
    values: Vec<Vec<String>>,
}

impl SheetsClient {
    /// Build a client from configuration and the bearer token.
    pub fn new(config: &SheetsConfig, token: &str) -> std::result::Result<Self, SetupError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SetupError::InvalidConfig(format!("sheets HTTP client: {e}")))?;

        Ok(Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            summary_range: config.summary_range.clone(),
            items_range: config.items_range.clone(),
            token: token.to_string(),
            client,
        })
    }

    /// Point the client at a different API host (proxy or test server).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn append_rows(&self, range: &str, values: Vec<Vec<String>>) -> Result<()> {
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}:append?valueInputOption=USER_ENTERED",
            self.base_url, self.spreadsheet_id, range
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&AppendRequest { values })
            .send()
            .map_err(|e| WriteError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WriteError::Service {
                status: status.as_u16(),
                range: range.to_string(),
                body: response.text().unwrap_or_default(),
            });
        }

        debug!("appended rows to {}", range);
        Ok(())
    }
}

impl SheetWriter for SheetsClient {
    fn append(&self, receipt: &Receipt) -> Result<()> {
        self.append_rows(&self.summary_range, vec![summary_row(receipt)])?;

        let items = item_rows(receipt);
        if !items.is_empty() {
            self.append_rows(&self.items_range, items)?;
        }
        Ok(())
    }
}
