//! Integration tests for the voquest binary
//!
//! These exercise argument parsing and the validation that happens before
//! any request leaves the machine, so they run without network access.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn voquest() -> Command {
    Command::cargo_bin("voquest").expect("voquest binary should exist")
}

// --- Help and version ---

#[test]
fn test_no_args_shows_help_and_exits_two() {
    // A required subcommand makes clap print help on stderr and exit 2
    voquest()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_help_lists_every_subcommand() {
    let mut assert = voquest().arg("--help").assert().success();
    for name in ["registry", "resolve", "cone", "image", "spectrum", "lines", "tap"] {
        assert = assert.stdout(predicate::str::contains(name));
    }
}

#[test]
fn test_version_flag_shows_version() {
    voquest()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("voquest 0.4.0"));
}

#[test]
fn test_help_shows_global_flags() {
    let mut assert = voquest().arg("--help").assert().success();
    for flag in [
        "--config",
        "--registry-url",
        "--timeout",
        "--json",
        "--limit",
        "--columns",
        "--verbose",
    ] {
        assert = assert.stdout(predicate::str::contains(flag));
    }
}

// --- Subcommand help ---

#[test]
fn test_cone_help_shows_positionals() {
    voquest()
        .args(["cone", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<SERVICE>"))
        .stdout(predicate::str::contains("<RA>"))
        .stdout(predicate::str::contains("<DEC>"))
        .stdout(predicate::str::contains("<RADIUS>"))
        .stdout(predicate::str::contains("--verb"));
}

#[test]
fn test_image_help_shows_download_options() {
    voquest()
        .args(["image", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--download"))
        .stdout(predicate::str::contains("--output-dir"))
        .stdout(predicate::str::contains("--format"))
        .stdout(predicate::str::contains("--intersect"));
}

#[test]
fn test_tap_help_shows_query_argument() {
    voquest()
        .args(["tap", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<QUERY>"))
        .stdout(predicate::str::contains("--maxrec"));
}

// --- Validation before any request is sent ---

#[test]
fn test_rejects_unparseable_right_ascension() {
    voquest()
        .args(["cone", "http://example.org/scs", "nonsense", "10", "0.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot parse right ascension"));
}

#[test]
fn test_rejects_declination_given_in_hours() {
    voquest()
        .args(["cone", "http://example.org/scs", "83.6", "5h30m", "0.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("declination is measured in degrees"));
}

#[test]
fn test_rejects_unknown_service_type() {
    voquest()
        .args(["registry", "crab", "--type", "sound"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized servicetype value"));
}

#[test]
fn test_service_type_is_not_fully_case_folded() {
    voquest()
        .args(["registry", "crab", "--type", "TAP"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized servicetype value"));
}

#[test]
fn test_rejects_unknown_waveband() {
    voquest()
        .args(["registry", "crab", "--waveband", "loud"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized waveband"));
}

#[test]
fn test_rejects_inverted_wavelength_range() {
    voquest()
        .args(["lines", "http://example.org/slap", "3e-6", "1e-7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("wavelength range is inverted"));
}

#[test]
fn test_rejects_blank_adql() {
    voquest()
        .args(["tap", "http://example.org/tap", "  "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ADQL query is empty"));
}

#[test]
fn test_rejects_malformed_image_format() {
    voquest()
        .args([
            "image",
            "http://example.org/sia",
            "83.6",
            "22.0",
            "0.25",
            "--format",
            "graphics",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a MIME type"));
}

#[test]
fn test_missing_config_file_is_an_error() {
    voquest()
        .args([
            "registry",
            "crab",
            "--config",
            "/definitely/not/a/real/config.json",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read configuration file"));
}

#[test]
fn test_invalid_limit_is_a_usage_error() {
    voquest()
        .args(["--limit", "many", "registry", "crab"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--limit"));
}
