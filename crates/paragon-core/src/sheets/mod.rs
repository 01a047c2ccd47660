//! Spreadsheet boundary: fixed-order row mapping and the append client.

mod client;

pub use client::SheetsClient;

use crate::error::WriteError;
use crate::models::receipt::Receipt;

/// Result type for spreadsheet operations.
pub type Result<T> = std::result::Result<T, WriteError>;

/// Append-only sink for structured receipts.
pub trait SheetWriter {
    /// Append one summary row and one row per line item. Rows are never
    /// updated or deleted.
    fn append(&self, receipt: &Receipt) -> Result<()>;
}

/// Summary columns: Receipt ID, Store, Date, Total.
pub fn summary_row(receipt: &Receipt) -> Vec<String> {
    vec![
        receipt.receipt_id.clone(),
        receipt.store.clone(),
        receipt.date.to_string(),
        receipt.summary_total().to_string(),
    ]
}

/// Item columns: Receipt ID, Store, Date, Item, Category, Price, Taxable,
/// Price w/ Tax.
pub fn item_rows(receipt: &Receipt) -> Vec<Vec<String>> {
    receipt
        .items
        .iter()
        .map(|item| {
            vec![
                receipt.receipt_id.clone(),
                receipt.store.clone(),
                receipt.date.to_string(),
                item.name.clone(),
                item.category.clone(),
                item.price.to_string(),
                if item.taxable { "Yes" } else { "No" }.to_string(),
                item.price_with_tax.to_string(),
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    use crate::models::receipt::ReceiptItem;

    fn target_receipt() -> Receipt {
        Receipt {
            receipt_id: "r1.jpg".to_string(),
            store: "Target".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, 11).unwrap(),
            total: None,
            tax_total: None,
            items: vec![ReceiptItem {
                name: "Apples".to_string(),
                category: "Groceries".to_string(),
                price: Decimal::new(399, 2),
                taxable: false,
                price_with_tax: Decimal::new(399, 2),
            }],
        }
    }

    #[test]
    fn summary_row_columns_in_order() {
        assert_eq!(
            summary_row(&target_receipt()),
            vec!["r1.jpg", "Target", "2025-01-11", "3.99"]
        );
    }

    #[test]
    fn item_row_columns_in_order() {
        assert_eq!(
            item_rows(&target_receipt()),
            vec![vec![
                "r1.jpg",
                "Target",
                "2025-01-11",
                "Apples",
                "Groceries",
                "3.99",
                "No",
                "3.99"
            ]]
        );
    }

    #[test]
    fn taxable_item_renders_yes_and_taxed_price() {
        let mut receipt = target_receipt();
        receipt.items.push(ReceiptItem {
            name: "Shampoo".to_string(),
            category: "Health".to_string(),
            price: Decimal::new(749, 2),
            taxable: true,
            price_with_tax: Decimal::new(809, 2),
        });

        let rows = item_rows(&receipt);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][5], "7.49");
        assert_eq!(rows[1][6], "Yes");
        assert_eq!(rows[1][7], "8.09");
    }

    #[test]
    fn item_order_is_preserved() {
        let mut receipt = target_receipt();
        receipt.items.push(ReceiptItem {
            name: "Bananas".to_string(),
            category: "Groceries".to_string(),
            price: Decimal::new(500, 2),
            taxable: false,
            price_with_tax: Decimal::new(500, 2),
        });

        let names: Vec<String> = item_rows(&receipt).iter().map(|r| r[3].clone()).collect();
        assert_eq!(names, vec!["Apples", "Bananas"]);
    }
}
