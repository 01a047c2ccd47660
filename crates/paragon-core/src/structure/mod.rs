//! Structured parsing: OCR text to a validated [`Receipt`] via a language
//! model.

mod client;
mod prompt;
mod response;

pub use client::{ChatClient, MockChatClient, OpenAiClient};
pub use prompt::build_prompt;
pub use response::{RawItem, RawReceipt, into_receipt, parse_reply};

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::error::ParseError;
use crate::models::config::{CategoryConfig, LlmConfig, PipelineConfig};
use crate::models::receipt::Receipt;

/// Result type for structuring operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Turns raw OCR text into a schema-validated receipt.
pub trait RecordParser {
    /// Parse one receipt's text; `receipt_id` is carried into the record.
    fn parse(&self, receipt_id: &str, text: &str) -> Result<Receipt>;
}

/// Production parser: prompt a chat model, falling back through the
/// configured model list, then validate the reply strictly.
pub struct LlmParser {
    client: Box<dyn ChatClient>,
    models: Vec<String>,
    categories: CategoryConfig,
    tax_rate: Decimal,
}

impl LlmParser {
    /// Build a parser over any chat client.
    pub fn new(client: Box<dyn ChatClient>, config: &PipelineConfig) -> Self {
        Self::with_parts(client, &config.llm, &config.categories, config.tax.rate)
    }

    /// Build a parser from the individual config pieces.
    pub fn with_parts(
        client: Box<dyn ChatClient>,
        llm: &LlmConfig,
        categories: &CategoryConfig,
        tax_rate: Decimal,
    ) -> Self {
        Self {
            client,
            models: llm.models.clone(),
            categories: categories.clone(),
            tax_rate,
        }
    }

    fn try_model(&self, model: &str, prompt: &str, receipt_id: &str) -> Result<Receipt> {
        let reply = self.client.complete(model, prompt)?;
        let raw = response::parse_reply(&reply)?;
        response::into_receipt(raw, receipt_id, &self.categories, self.tax_rate)
    }
}

impl RecordParser for LlmParser {
    fn parse(&self, receipt_id: &str, text: &str) -> Result<Receipt> {
        let prompt = prompt::build_prompt(&self.categories.vocabulary, text);

        let mut last_error = None;
        for model in &self.models {
            match self.try_model(model, &prompt, receipt_id) {
                Ok(receipt) => {
                    debug!("parsed {} using {}", receipt_id, model);
                    return Ok(receipt);
                }
                Err(e) => {
                    warn!("model {} failed for {}: {}", model, receipt_id, e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => Err(ParseError::AllModelsFailed(Box::new(e))),
            None => Err(ParseError::Malformed("no models configured".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn parser_with(client: MockChatClient) -> LlmParser {
        let config = PipelineConfig::default();
        LlmParser::new(Box::new(client), &config)
    }

    const GOOD_REPLY: &str = r#"{
        "Store name": "Target",
        "Purchase date": "2025-01-11",
        "Total amount": 3.99,
        "Tax total": 0,
        "Items": [{"Item": "Apples", "Category": "Groceries", "Price": 3.99, "Taxable": false}]
    }"#;

    #[test]
    fn parses_a_good_reply() {
        let parser = parser_with(MockChatClient::always(GOOD_REPLY));
        let receipt = parser.parse("r1.jpg", "Target receipt text").unwrap();
        assert_eq!(receipt.store, "Target");
        assert_eq!(receipt.date, NaiveDate::from_ymd_opt(2025, 1, 11).unwrap());
    }

    #[test]
    fn falls_back_to_the_next_model() {
        let parser = parser_with(MockChatClient::scripted(vec![
            ("gpt-4o".to_string(), Err("overloaded".to_string())),
            ("gpt-4o-mini".to_string(), Ok(GOOD_REPLY.to_string())),
        ]));
        let receipt = parser.parse("r1.jpg", "text").unwrap();
        assert_eq!(receipt.store, "Target");
    }

    #[test]
    fn all_models_failing_reports_the_last_error() {
        let parser = parser_with(MockChatClient::scripted(vec![
            ("gpt-4o".to_string(), Err("overloaded".to_string())),
            ("gpt-4o-mini".to_string(), Ok("no json here".to_string())),
        ]));
        let result = parser.parse("r1.jpg", "text");
        match result {
            Err(ParseError::AllModelsFailed(inner)) => {
                assert!(matches!(*inner, ParseError::NoJson));
            }
            other => panic!("expected AllModelsFailed, got {other:?}"),
        }
    }
}
