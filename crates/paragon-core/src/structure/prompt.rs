//! Extraction prompt sent to the language model.

/// Build the single-turn extraction prompt for one receipt's OCR text.
///
/// The model does all categorization, constrained to the configured
/// vocabulary; arithmetic is deliberately kept out of the prompt.
pub fn build_prompt(vocabulary: &[String], ocr_text: &str) -> String {
    let categories = vocabulary.join(", ");
    format!(
        r#"You are a precise data-extraction assistant. From the receipt text below, extract:
- Store name
- Purchase date (YYYY-MM-DD)
- Total amount (numeric)
- Tax total (numeric, if present; otherwise 0)
- An itemized list of each item with:
    - Item name
    - Category (choose ONE from: {categories})
    - Price (numeric, pre-tax if the receipt separates tax)
    - Taxable (true or false) - decide based on markings or context in the receipt text

Return ONLY valid JSON (no commentary) in this format:

{{
  "Store name": "...",
  "Purchase date": "YYYY-MM-DD",
  "Total amount": 123.45,
  "Tax total": 1.23,
  "Items": [
    {{"Item": "Bananas", "Category": "Groceries", "Price": 5.00, "Taxable": false}},
    {{"Item": "Shampoo", "Category": "Health", "Price": 9.00, "Taxable": true}}
  ]
}}

Receipt text:
"""
{ocr_text}
"""
"#
    )
}
