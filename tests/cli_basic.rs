//! Integration tests for basic CLI behavior.
//!
//! Everything here stays offline: flags, help text and argument errors that
//! are reported before the first request.

#![allow(deprecated)] // cargo_bin deprecation, replacement not yet stable

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper: get a Command for the `tvthek` binary with a config path that
/// does not exist, so built-in defaults apply.
fn tvthek() -> Command {
    let mut cmd = Command::cargo_bin("tvthek").expect("binary 'tvthek' should be built");
    cmd.args(["--config", "/nonexistent/tvthek/config.toml"]);
    cmd
}

// ─── Top-level flags ─────────────────────────────────────────────────────────

#[test]
fn help_flag_shows_usage() {
    tvthek()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: tvthek"))
        .stdout(predicate::str::contains("letters"))
        .stdout(predicate::str::contains("bucket"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("videos"))
        .stdout(predicate::str::contains("--mode"));
}

#[test]
fn version_flag_shows_semver() {
    Command::cargo_bin("tvthek")
        .expect("binary 'tvthek' should be built")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^tvthek \d+\.\d+\.\d+\n$").unwrap());
}

#[test]
fn no_subcommand_shows_error_and_usage() {
    tvthek()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage: tvthek"));
}

#[test]
fn invalid_subcommand_fails() {
    tvthek()
        .arg("this-is-not-a-real-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

// ─── Subcommand help ─────────────────────────────────────────────────────────

#[test]
fn bucket_help() {
    tvthek()
        .args(["bucket", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("programs filed under one letter"))
        .stdout(predicate::str::contains("<KEY>"));
}

#[test]
fn list_help() {
    tvthek()
        .args(["list", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("episodes of a program"))
        .stdout(predicate::str::contains("<URI>"));
}

#[test]
fn videos_help() {
    tvthek()
        .args(["videos", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("playable videos"))
        .stdout(predicate::str::contains("--json"));
}

// ─── Argument errors ─────────────────────────────────────────────────────────

#[test]
fn unknown_mode_is_rejected() {
    tvthek()
        .args(["--mode", "xml", "letters"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"))
        .stderr(predicate::str::contains("service"));
}

#[test]
fn bucket_key_must_be_single_char() {
    tvthek()
        .args(["bucket", "ab"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn bucket_key_outside_index_fails_before_fetching() {
    tvthek()
        .args(["bucket", "!"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no bucket"));
}

#[test]
fn list_requires_uri() {
    tvthek()
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<URI>"));
}

#[test]
fn malformed_config_is_reported() {
    let dir = std::env::temp_dir().join(format!("tvthek-cli-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.toml");
    std::fs::write(&path, "entries_per_page = \"lots\"\n").unwrap();

    Command::cargo_bin("tvthek")
        .expect("binary 'tvthek' should be built")
        .args(["--config", path.to_str().unwrap(), "letters"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config error"));

    std::fs::remove_dir_all(&dir).ok();
}
