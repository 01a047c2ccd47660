//! End-to-end tests for the paragon binary. Nothing here talks to a remote
//! service: they exercise argument handling, config plumbing, and the
//! setup-error exit path.

use assert_cmd::Command;
use predicates::prelude::*;

fn paragon() -> Command {
    Command::cargo_bin("paragon").unwrap()
}

/// A config that passes validation but points at local folders.
fn runnable_config(dir: &std::path::Path) -> std::path::PathBuf {
    let config_path = dir.join("config.json");
    let config = serde_json::json!({
        "storage": { "source_dir": dir.join("receipts") },
        "ocr": { "endpoint": "https://ocr.example.com" },
        "sheets": { "spreadsheet_id": "sheet-123" }
    });
    std::fs::write(&config_path, config.to_string()).unwrap();
    config_path
}

#[test]
fn help_lists_subcommands() {
    paragon()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("process"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn config_path_honors_the_global_flag() {
    paragon()
        .args(["--config", "/tmp/custom-paragon.json", "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/tmp/custom-paragon.json"));
}

#[test]
fn config_init_then_show_roundtrips() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    let config_arg = config_path.to_str().unwrap();

    paragon()
        .args(["--config", config_arg, "config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));

    paragon()
        .args(["--config", config_arg, "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Summary!A:D"))
        .stdout(predicate::str::contains("Items!A:H"));
}

#[test]
fn config_get_reads_a_nested_key() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = runnable_config(dir.path());

    paragon()
        .args(["--config", config_path.to_str().unwrap(), "config", "get", "sheets.spreadsheet_id"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sheet-123"));
}

#[test]
fn config_set_rejects_an_invalid_value() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = runnable_config(dir.path());

    paragon()
        .args(["--config", config_path.to_str().unwrap(), "config", "set", "ocr.timeout_secs", "\"ten\""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid value"));
}

#[test]
fn run_with_missing_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();

    paragon()
        .current_dir(dir.path())
        .args(["--config", "no-such-config.json", "run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load config"));
}

#[test]
fn run_with_incomplete_config_is_a_setup_error() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    std::fs::write(&config_path, "{}").unwrap();

    paragon()
        .current_dir(dir.path())
        .args(["--config", config_path.to_str().unwrap(), "run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ocr.endpoint"));
}

#[test]
fn run_without_credentials_fails_before_touching_files() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = runnable_config(dir.path());

    paragon()
        .current_dir(dir.path())
        .env_remove("PARAGON_OCR_KEY")
        .env_remove("OPENAI_API_KEY")
        .env_remove("PARAGON_SHEETS_TOKEN")
        .args(["--config", config_path.to_str().unwrap(), "run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("PARAGON_OCR_KEY"));

    // setup errors abort before the folder layout is created
    assert!(!dir.path().join("receipts").exists());
}

#[test]
fn process_rejects_unsupported_file_formats() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = runnable_config(dir.path());
    let input = dir.path().join("notes.txt");
    std::fs::write(&input, "not a receipt").unwrap();

    paragon()
        .current_dir(dir.path())
        .args(["--config", config_path.to_str().unwrap(), "process", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"));
}
