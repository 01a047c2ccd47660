//! Strict validation of the model's reply.
//!
//! The reply is untyped text; everything leaves this module either as a
//! schema-checked [`Receipt`] or as a typed [`ParseError`]. Wire keys match
//! the JSON format the prompt demands.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;
use tracing::debug;

use crate::error::ParseError;
use crate::models::config::CategoryConfig;
use crate::models::receipt::{Receipt, ReceiptItem};
use crate::tax;

lazy_static! {
    /// First-to-last brace span, dot matching newlines; models often wrap
    /// the JSON in prose or a code fence.
    static ref JSON_OBJECT: Regex = Regex::new(r"(?s)\{.*\}").unwrap();
}

/// Raw reply payload, exactly as the prompt specifies it.
#[derive(Debug, Deserialize)]
pub struct RawReceipt {
    #[serde(rename = "Store name")]
    pub store: String,

    #[serde(rename = "Purchase date")]
    pub date: String,

    #[serde(rename = "Total amount")]
    pub total: Option<f64>,

    #[serde(rename = "Tax total")]
    pub tax_total: Option<f64>,

    #[serde(rename = "Items")]
    pub items: Vec<RawItem>,
}

/// Raw line item from the reply.
#[derive(Debug, Deserialize)]
pub struct RawItem {
    #[serde(rename = "Item")]
    pub name: String,

    #[serde(rename = "Category")]
    pub category: String,

    #[serde(rename = "Price")]
    pub price: f64,

    #[serde(rename = "Taxable", default)]
    pub taxable: bool,
}

/// Locate and deserialize the JSON object inside a model reply.
pub fn parse_reply(reply: &str) -> Result<RawReceipt, ParseError> {
    let json = JSON_OBJECT
        .find(reply)
        .ok_or(ParseError::NoJson)?
        .as_str();
    serde_json::from_str(json).map_err(|e| ParseError::Schema(e.to_string()))
}

/// Validate a raw payload into a [`Receipt`], coercing categories and
/// computing per-item price with tax.
pub fn into_receipt(
    raw: RawReceipt,
    receipt_id: &str,
    categories: &CategoryConfig,
    tax_rate: Decimal,
) -> Result<Receipt, ParseError> {
    if raw.store.trim().is_empty() {
        return Err(ParseError::Schema("empty store name".to_string()));
    }

    let date = NaiveDate::parse_from_str(raw.date.trim(), "%Y-%m-%d")
        .map_err(|_| ParseError::InvalidDate(raw.date.clone()))?;

    let mut items = Vec::with_capacity(raw.items.len());
    for raw_item in raw.items {
        let price = decimal_price(raw_item.price).ok_or(ParseError::InvalidPrice {
            item: raw_item.name.clone(),
            value: raw_item.price,
        })?;

        let category = resolve_category(&raw_item.category, categories);
        let price_with_tax = tax::price_with_tax(price, raw_item.taxable, tax_rate);

        items.push(ReceiptItem {
            name: raw_item.name,
            category,
            price,
            taxable: raw_item.taxable,
            price_with_tax,
        });
    }

    Ok(Receipt {
        receipt_id: receipt_id.to_string(),
        store: raw.store.trim().to_string(),
        date,
        total: raw.total.and_then(decimal_price),
        tax_total: raw.tax_total.and_then(decimal_price),
        items,
    })
}

/// Match the model's category against the vocabulary, case-insensitively,
/// returning the canonical spelling; anything unrecognized becomes the
/// configured fallback.
fn resolve_category(candidate: &str, categories: &CategoryConfig) -> String {
    let trimmed = candidate.trim();
    for known in &categories.vocabulary {
        if known.eq_ignore_ascii_case(trimmed) {
            return known.clone();
        }
    }
    debug!(
        "category {:?} not in vocabulary, using {:?}",
        trimmed, categories.fallback
    );
    categories.fallback.clone()
}

fn decimal_price(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_f64(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn categories() -> CategoryConfig {
        CategoryConfig::default()
    }

    fn target_reply() -> &'static str {
        r#"Here is the extraction you asked for:
{
  "Store name": "Target",
  "Purchase date": "2025-01-11",
  "Total amount": 3.99,
  "Tax total": 0,
  "Items": [
    {"Item": "Apples", "Category": "Groceries", "Price": 3.99, "Taxable": false}
  ]
}
Let me know if you need anything else."#
    }

    #[test]
    fn parses_json_embedded_in_prose() {
        let raw = parse_reply(target_reply()).unwrap();
        assert_eq!(raw.store, "Target");
        assert_eq!(raw.items.len(), 1);
        assert_eq!(raw.items[0].name, "Apples");
        assert!(!raw.items[0].taxable);
    }

    #[test]
    fn reply_without_json_is_an_error() {
        assert!(matches!(
            parse_reply("I could not read this receipt."),
            Err(ParseError::NoJson)
        ));
    }

    #[test]
    fn invalid_json_is_a_schema_error() {
        assert!(matches!(
            parse_reply("{not json}"),
            Err(ParseError::Schema(_))
        ));
    }

    #[test]
    fn missing_date_is_a_schema_error() {
        let reply = r#"{
            "Store name": "Target",
            "Items": [{"Item": "Apples", "Category": "Groceries", "Price": 3.99}]
        }"#;
        assert!(matches!(parse_reply(reply), Err(ParseError::Schema(_))));
    }

    #[test]
    fn non_iso_date_is_an_invalid_date() {
        let reply = r#"{
            "Store name": "Target",
            "Purchase date": "01/11/2025",
            "Items": []
        }"#;
        let raw = parse_reply(reply).unwrap();
        let result = into_receipt(raw, "r.jpg", &categories(), Decimal::ZERO);
        assert!(matches!(result, Err(ParseError::InvalidDate(_))));
    }

    #[test]
    fn target_receipt_converts_exactly() {
        let raw = parse_reply(target_reply()).unwrap();
        let receipt = into_receipt(raw, "r1.jpg", &categories(), Decimal::new(8, 2)).unwrap();

        assert_eq!(receipt.receipt_id, "r1.jpg");
        assert_eq!(receipt.store, "Target");
        assert_eq!(receipt.date, NaiveDate::from_ymd_opt(2025, 1, 11).unwrap());
        assert_eq!(receipt.summary_total(), Decimal::new(399, 2));

        let item = &receipt.items[0];
        assert_eq!(item.category, "Groceries");
        assert_eq!(item.price, Decimal::new(399, 2));
        // tax-exempt: price unchanged even with a configured rate
        assert_eq!(item.price_with_tax, Decimal::new(399, 2));
    }

    #[test]
    fn taxable_item_gets_price_with_tax() {
        let reply = r#"{
            "Store name": "Walgreens",
            "Purchase date": "2025-02-01",
            "Items": [
                {"Item": "Bananas", "Category": "Groceries", "Price": 5.00, "Taxable": false},
                {"Item": "Shampoo", "Category": "Health", "Price": 7.49, "Taxable": true}
            ]
        }"#;
        let raw = parse_reply(reply).unwrap();
        let receipt = into_receipt(raw, "w.pdf", &categories(), Decimal::new(8, 2)).unwrap();

        assert_eq!(receipt.items[0].price_with_tax, Decimal::new(500, 2));
        assert_eq!(receipt.items[1].price_with_tax, Decimal::new(809, 2));
    }

    #[test]
    fn unknown_category_coerces_to_fallback() {
        let reply = r#"{
            "Store name": "Target",
            "Purchase date": "2025-01-11",
            "Items": [{"Item": "Gadget", "Category": "Electronics", "Price": 19.99}]
        }"#;
        let raw = parse_reply(reply).unwrap();
        let receipt = into_receipt(raw, "t.jpg", &categories(), Decimal::ZERO).unwrap();
        assert_eq!(receipt.items[0].category, "Other");
    }

    #[test]
    fn category_match_is_case_insensitive() {
        let reply = r#"{
            "Store name": "Target",
            "Purchase date": "2025-01-11",
            "Items": [{"Item": "Apples", "Category": "groceries", "Price": 3.99}]
        }"#;
        let raw = parse_reply(reply).unwrap();
        let receipt = into_receipt(raw, "t.jpg", &categories(), Decimal::ZERO).unwrap();
        assert_eq!(receipt.items[0].category, "Groceries");
    }

    #[test]
    fn non_finite_price_is_rejected() {
        let raw = RawReceipt {
            store: "Target".to_string(),
            date: "2025-01-11".to_string(),
            total: None,
            tax_total: None,
            items: vec![RawItem {
                name: "Apples".to_string(),
                category: "Groceries".to_string(),
                price: f64::NAN,
                taxable: false,
            }],
        };
        assert!(matches!(
            into_receipt(raw, "t.jpg", &categories(), Decimal::ZERO),
            Err(ParseError::InvalidPrice { .. })
        ));
    }

    #[test]
    fn empty_items_are_accepted() {
        let reply = r#"{
            "Store name": "Target",
            "Purchase date": "2025-01-11",
            "Items": []
        }"#;
        let raw = parse_reply(reply).unwrap();
        let receipt = into_receipt(raw, "t.jpg", &categories(), Decimal::ZERO).unwrap();
        assert!(receipt.items.is_empty());
        assert_eq!(receipt.summary_total(), Decimal::ZERO);
    }
}
