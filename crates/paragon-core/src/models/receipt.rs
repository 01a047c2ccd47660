//! Receipt data model produced by the structured parser.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A fully structured receipt, ready for the spreadsheet writer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    /// Identifier of the source file, carried through for traceability.
    pub receipt_id: String,

    /// Store name as reported by the model.
    pub store: String,

    /// Purchase date.
    pub date: NaiveDate,

    /// Receipt-level total as printed on the receipt, when the model found one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<Decimal>,

    /// Receipt-level tax total, when the model found one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_total: Option<Decimal>,

    /// Line items in receipt order.
    pub items: Vec<ReceiptItem>,
}

/// One purchased item on a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptItem {
    /// Item description.
    pub name: String,

    /// Expense category, always a member of the configured vocabulary.
    pub category: String,

    /// Pre-tax price.
    pub price: Decimal,

    /// Whether sales tax applies to this item.
    pub taxable: bool,

    /// Price after tax, rounded to currency precision. Equals `price` for
    /// non-taxable items.
    pub price_with_tax: Decimal,
}

impl Receipt {
    /// Receipt total for the summary row: the printed total when the model
    /// reported one, otherwise the sum of item prices with tax.
    pub fn summary_total(&self) -> Decimal {
        self.total
            .unwrap_or_else(|| self.items.iter().map(|i| i.price_with_tax).sum())
    }
}
