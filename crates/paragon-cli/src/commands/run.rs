//! Run command - process every pending receipt in the source folder.
//!
//! This is the entry point a cron job calls. Per-file failures are logged
//! and skipped; only setup failures (bad config, missing credentials) exit
//! non-zero.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use paragon_core::models::config::Credentials;
use paragon_core::models::run::RunOutcome;
use paragon_core::pipeline::{FileReport, Pipeline};
use paragon_core::runlog::FileRunLogger;
use paragon_core::sheets::SheetsClient;
use paragon_core::store::LocalFolderStore;
use paragon_core::structure::{LlmParser, OpenAiClient};
use paragon_core::ocr::RemoteOcr;

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Also write a per-file summary CSV to this path
    #[arg(long)]
    summary: Option<PathBuf>,
}

pub fn run(args: RunArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    // Credentials may live in a .env next to the cron entry
    let _ = dotenvy::dotenv();

    let config = super::load_config(config_path)?;
    config.validate()?;
    let credentials = Credentials::from_env()?;

    let store = LocalFolderStore::open(&config.storage)?;
    let logger = FileRunLogger::new(store.log_path());
    let extractor = RemoteOcr::new(&config.ocr, &credentials.ocr_key)?;
    let chat = OpenAiClient::new(&config.llm, &credentials.llm_key)?;
    let parser = LlmParser::new(Box::new(chat), &config);
    let writer = SheetsClient::new(&config.sheets, &credentials.sheets_token)?;

    let pipeline = Pipeline::new(&store, &extractor, &parser, &writer, &logger);

    let files = pipeline.list_pending()?;
    if files.is_empty() {
        println!("{} No pending receipts", style("ℹ").blue());
        return Ok(());
    }

    println!(
        "{} Found {} receipts to process",
        style("ℹ").blue(),
        files.len()
    );

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut reports = Vec::with_capacity(files.len());
    for file in &files {
        pb.set_message(file.name.clone());
        reports.push(pipeline.process_and_log(file));
        pb.inc(1);
    }
    pb.finish_with_message("Complete");

    if let Some(summary_path) = &args.summary {
        write_summary(summary_path, &reports)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let succeeded = reports.iter().filter(|r| r.succeeded()).count();
    let failed = reports.len() - succeeded;

    println!();
    println!(
        "{} Processed {} receipts in {:?}",
        style("✓").green(),
        reports.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(succeeded).green(),
        style(failed).red()
    );

    if failed > 0 {
        println!();
        println!("{}", style("Failed receipts:").red());
        for report in reports.iter().filter(|r| !r.succeeded()) {
            if let RunOutcome::Failed { stage, reason } = &report.outcome {
                println!("  - {} ({}): {}", report.file.id, stage, reason);
            }
        }
    }

    Ok(())
}

fn write_summary(path: &PathBuf, reports: &[FileReport]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "file",
        "status",
        "receipt_id",
        "store",
        "date",
        "total",
        "items",
        "processing_time_ms",
        "error",
    ])?;

    for report in reports {
        match (&report.receipt, &report.outcome) {
            (Some(receipt), RunOutcome::Succeeded { .. }) => {
                wtr.write_record([
                    report.file.id.as_str(),
                    "success",
                    &receipt.receipt_id,
                    &receipt.store,
                    &receipt.date.to_string(),
                    &receipt.summary_total().to_string(),
                    &receipt.items.len().to_string(),
                    &report.duration_ms.to_string(),
                    "",
                ])?;
            }
            (_, RunOutcome::Failed { stage, reason }) => {
                wtr.write_record([
                    report.file.id.as_str(),
                    "error",
                    "",
                    "",
                    "",
                    "",
                    "",
                    &report.duration_ms.to_string(),
                    &format!("{stage}: {reason}"),
                ])?;
            }
            _ => {}
        }
    }

    wtr.flush()?;
    Ok(())
}
