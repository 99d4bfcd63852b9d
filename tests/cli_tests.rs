//! Integration tests for the CLI interface
//!
//! Covers argument parsing, mode validation, and the purge confirmation
//! path. Tests that reach the connection step point at an unreachable
//! emulator address so nothing talks to a real Pub/Sub endpoint.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_cli_help_flag() {
    let mut cmd = Command::cargo_bin("gundi-dlq").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("--from-sub"))
        .stdout(predicate::str::contains("--purge"))
        .stdout(predicate::str::contains("--msg-type-exclude"))
        .stdout(predicate::str::contains("--batch-size"));
}

#[test]
fn test_version_flag() {
    let mut cmd = Command::cargo_bin("gundi-dlq").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("gundi-dlq"));
}

#[test]
fn test_missing_required_args() {
    // --from-sub and --project are required
    let mut cmd = Command::cargo_bin("gundi-dlq").unwrap();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn test_both_mode_flags_rejected() {
    let mut cmd = Command::cargo_bin("gundi-dlq").unwrap();
    cmd.args([
        "--from-sub",
        "errors-dlq",
        "--to-topic",
        "events",
        "--project",
        "test-project",
        "--reprocess",
        "--purge",
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains(
        "Cannot use --reprocess and --purge together",
    ));
}

#[test]
fn test_mode_flag_required() {
    let mut cmd = Command::cargo_bin("gundi-dlq").unwrap();
    cmd.args(["--from-sub", "errors-dlq", "--project", "test-project"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Must use either --reprocess or --purge",
        ));
}

#[test]
fn test_reprocess_requires_topic() {
    let mut cmd = Command::cargo_bin("gundi-dlq").unwrap();
    cmd.args([
        "--from-sub",
        "errors-dlq",
        "--project",
        "test-project",
        "--reprocess",
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains(
        "Must provide a target topic with --reprocess",
    ));
}

#[test]
fn test_invalid_batch_size() {
    let mut cmd = Command::cargo_bin("gundi-dlq").unwrap();
    cmd.args([
        "--from-sub",
        "errors-dlq",
        "--project",
        "test-project",
        "--purge",
        "--batch-size",
        "not-a-number",
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("error:"));
}

#[test]
fn test_purge_decline_exits_cleanly() {
    // The purge confirmation comes before any pull, so declining never
    // touches the (unreachable) emulator address.
    let mut cmd = Command::cargo_bin("gundi-dlq").unwrap();
    cmd.env("PUBSUB_EMULATOR_HOST", "localhost:1")
        .args([
            "--from-sub",
            "errors-dlq",
            "--project",
            "test-project",
            "--purge",
        ])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("may cause data loss"))
        .stdout(predicate::str::contains("Exiting.."));
}

#[test]
fn test_purge_confirmation_defaults_to_no() {
    // Just pressing enter must not start a purge.
    let mut cmd = Command::cargo_bin("gundi-dlq").unwrap();
    cmd.env("PUBSUB_EMULATOR_HOST", "localhost:1")
        .args([
            "--from-sub",
            "errors-dlq",
            "--project",
            "test-project",
            "--purge",
        ])
        .write_stdin("\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exiting.."));
}
