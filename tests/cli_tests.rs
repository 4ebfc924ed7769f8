//! CLI surface tests
//!
//! These only exercise argument handling; nothing here touches the network
//! or launches a browser.

use assert_cmd::Command;
use predicates::prelude::*;

fn coinflow() -> Command {
    Command::cargo_bin("coinflow").unwrap()
}

#[test]
fn test_help_lists_the_report_commands() {
    coinflow()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("flow"))
        .stdout(predicate::str::contains("supply"))
        .stdout(predicate::str::contains("all"));
}

#[test]
fn test_flow_help_documents_the_overrides() {
    coinflow()
        .args(["flow", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--start-date"))
        .stdout(predicate::str::contains("--dump-html"));
}

#[test]
fn test_unknown_asset_is_rejected() {
    coinflow()
        .args(["flow", "doge"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_malformed_start_date_is_rejected() {
    coinflow()
        .args(["supply", "--start-date", "not-a-date"])
        .assert()
        .failure();
}

#[test]
fn test_missing_subcommand_prints_usage() {
    coinflow()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
