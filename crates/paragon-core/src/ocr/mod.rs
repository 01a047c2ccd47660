//! Text extraction boundary: embedded PDF text or a remote document-OCR
//! service.

use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{ExtractError, SetupError};
use crate::models::config::OcrConfig;
use crate::store::FileKind;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Bridge from file bytes to plain text.
pub trait TextExtractor {
    /// Extract the full text of one receipt file.
    fn extract(&self, bytes: &[u8], kind: FileKind) -> Result<String>;
}

/// Production extractor: prefers embedded PDF text, otherwise uploads the
/// bytes to a document-OCR service and polls the analyze operation.
pub struct RemoteOcr {
    endpoint: String,
    api_version: String,
    key: String,
    poll_interval: Duration,
    poll_attempts: u32,
    prefer_embedded_text: bool,
    min_text_length: usize,
    client: reqwest::blocking::Client,
}

impl RemoteOcr {
    /// Build an extractor from configuration and the service key.
    pub fn new(config: &OcrConfig, key: &str) -> std::result::Result<Self, SetupError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SetupError::InvalidConfig(format!("OCR HTTP client: {e}")))?;

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            key: key.to_string(),
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            poll_attempts: config.poll_attempts,
            prefer_embedded_text: config.prefer_embedded_text,
            min_text_length: config.min_text_length,
            client,
        })
    }

    fn analyze_url(&self) -> String {
        format!(
            "{}/documentintelligence/documentModels/prebuilt-read:analyze?api-version={}",
            self.endpoint, self.api_version
        )
    }

    /// Upload the document and poll until the analysis settles.
    fn remote_extract(&self, bytes: &[u8], kind: FileKind) -> Result<String> {
        let response = self
            .client
            .post(self.analyze_url())
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .header("Content-Type", kind.mime())
            .body(bytes.to_vec())
            .send()
            .map_err(|e| ExtractError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::Service {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        let result_url = response
            .headers()
            .get("Operation-Location")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ExtractError::Malformed("no Operation-Location header".to_string()))?
            .to_string();

        for _ in 0..self.poll_attempts {
            std::thread::sleep(self.poll_interval);

            let poll: serde_json::Value = self
                .client
                .get(&result_url)
                .header("Ocp-Apim-Subscription-Key", &self.key)
                .send()
                .map_err(|e| ExtractError::Http(e.to_string()))?
                .json()
                .map_err(|e| ExtractError::Malformed(e.to_string()))?;

            match poll.get("status").and_then(|s| s.as_str()).unwrap_or("") {
                "succeeded" => {
                    let result = poll
                        .get("analyzeResult")
                        .ok_or_else(|| ExtractError::Malformed("no analyzeResult".to_string()))?;
                    return Ok(collect_text(result));
                }
                "failed" => {
                    let message = poll
                        .get("error")
                        .and_then(|e| e.get("message"))
                        .and_then(|m| m.as_str())
                        .unwrap_or("unknown error");
                    return Err(ExtractError::Analysis(message.to_string()));
                }
                _ => {}
            }
        }

        Err(ExtractError::Timeout {
            attempts: self.poll_attempts,
        })
    }
}

impl TextExtractor for RemoteOcr {
    fn extract(&self, bytes: &[u8], kind: FileKind) -> Result<String> {
        if kind.is_pdf() && self.prefer_embedded_text {
            match embedded_pdf_text(bytes) {
                Ok(text) if text.trim().len() >= self.min_text_length => {
                    debug!("using {} chars of embedded PDF text", text.len());
                    return Ok(text);
                }
                Ok(_) => debug!("embedded PDF text too short, falling back to OCR"),
                Err(e) => warn!("embedded text extraction failed, falling back to OCR: {e}"),
            }
        }

        let text = self.remote_extract(bytes, kind)?;
        if text.trim().is_empty() {
            return Err(ExtractError::Empty);
        }
        Ok(text)
    }
}

/// Pull embedded text out of a PDF without touching the OCR service.
fn embedded_pdf_text(bytes: &[u8]) -> Result<String> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
}

/// Full document text: the service's `content` field when present, else the
/// page lines joined in reading order.
fn collect_text(result: &serde_json::Value) -> String {
    if let Some(content) = result.get("content").and_then(|c| c.as_str()) {
        if !content.trim().is_empty() {
            return content.to_string();
        }
    }

    let mut lines = Vec::new();
    if let Some(pages) = result.get("pages").and_then(|p| p.as_array()) {
        for page in pages {
            if let Some(page_lines) = page.get("lines").and_then(|l| l.as_array()) {
                for line in page_lines {
                    if let Some(text) = line.get("content").and_then(|c| c.as_str()) {
                        lines.push(text.to_string());
                    }
                }
            }
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config(endpoint: &str) -> OcrConfig {
        OcrConfig {
            endpoint: endpoint.to_string(),
            ..OcrConfig::default()
        }
    }

    #[test]
    fn constructor_trims_trailing_slash() {
        let ocr = RemoteOcr::new(&config("https://ocr.example.com/"), "key").unwrap();
        assert_eq!(ocr.endpoint, "https://ocr.example.com");
        assert!(ocr.analyze_url().starts_with("https://ocr.example.com/documentintelligence"));
    }

    #[test]
    fn garbage_bytes_are_not_a_pdf() {
        assert!(embedded_pdf_text(b"not a pdf at all").is_err());
    }

    #[test]
    fn unreachable_endpoint_is_a_transport_error() {
        let mut cfg = config("http://127.0.0.1:0");
        cfg.timeout_secs = 1;
        let ocr = RemoteOcr::new(&cfg, "key").unwrap();
        let result = ocr.extract(b"\xff\xd8\xff", FileKind::Jpeg);
        assert!(matches!(result, Err(ExtractError::Http(_))));
    }

    #[test]
    fn collect_text_prefers_content_field() {
        let result = serde_json::json!({
            "content": "TOTAL 3.99",
            "pages": [{"lines": [{"content": "ignored"}]}]
        });
        assert_eq!(collect_text(&result), "TOTAL 3.99");
    }

    #[test]
    fn collect_text_joins_page_lines() {
        let result = serde_json::json!({
            "pages": [
                {"lines": [{"content": "Target"}, {"content": "Apples $3.99"}]},
                {"lines": [{"content": "thank you"}]}
            ]
        });
        assert_eq!(collect_text(&result), "Target\nApples $3.99\nthank you");
    }
}
