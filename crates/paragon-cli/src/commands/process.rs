//! Process command - extract a single receipt file to stdout or a file.
//!
//! Runs OCR and structuring only: no spreadsheet write, no archive move, no
//! run-log entry. Useful for checking a receipt before a real run.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use paragon_core::Receipt;
use paragon_core::models::config::{LLM_KEY_VAR, OCR_KEY_VAR};
use paragon_core::ocr::{RemoteOcr, TextExtractor};
use paragon_core::store::FileKind;
use paragon_core::structure::{LlmParser, OpenAiClient, RecordParser};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or image)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

pub fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let config = super::load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let extension = args
        .input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    let kind = FileKind::from_extension(&extension)
        .with_context(|| format!("Unsupported file format: {extension}"))?;

    if config.ocr.endpoint.trim().is_empty() {
        anyhow::bail!("ocr.endpoint is not set; run 'paragon config init' and fill it in");
    }
    let ocr_key = std::env::var(OCR_KEY_VAR)
        .with_context(|| format!("{OCR_KEY_VAR} is not set"))?;
    let llm_key = std::env::var(LLM_KEY_VAR)
        .with_context(|| format!("{LLM_KEY_VAR} is not set"))?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );

    pb.set_message("Extracting text...");
    let bytes = fs::read(&args.input)?;
    let extractor = RemoteOcr::new(&config.ocr, &ocr_key)?;
    let text = extractor.extract(&bytes, kind)?;
    debug!("extracted {} chars", text.len());

    pb.set_message("Structuring receipt...");
    let receipt_id = args
        .input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("receipt")
        .to_string();
    let chat = OpenAiClient::new(&config.llm, &llm_key)?;
    let parser = LlmParser::new(Box::new(chat), &config);
    let receipt = parser.parse(&receipt_id, &text)?;

    pb.finish_and_clear();

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&receipt)?,
        OutputFormat::Text => format_text(&receipt),
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{output}");
    }

    Ok(())
}

fn format_text(receipt: &Receipt) -> String {
    let mut output = String::new();

    output.push_str(&format!("Receipt: {}\n", receipt.receipt_id));
    output.push_str(&format!("Store:   {}\n", receipt.store));
    output.push_str(&format!("Date:    {}\n", receipt.date));
    output.push('\n');

    output.push_str("Items:\n");
    for item in &receipt.items {
        output.push_str(&format!(
            "  {} ({}) {} {} -> {}\n",
            item.name,
            item.category,
            item.price,
            if item.taxable { "taxable" } else { "tax-exempt" },
            item.price_with_tax
        ));
    }

    output.push('\n');
    output.push_str(&format!("Total:   {}\n", receipt.summary_total()));
    if let Some(tax_total) = receipt.tax_total {
        output.push_str(&format!("Tax:     {tax_total}\n"));
    }

    output
}
