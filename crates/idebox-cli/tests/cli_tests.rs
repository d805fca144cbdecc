//! CLI smoke tests

use assert_cmd::Command;
use predicates::prelude::*;

fn idebox() -> Command {
    Command::cargo_bin("idebox").unwrap()
}

#[test]
fn help_lists_subcommands() {
    idebox()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("start"))
        .stdout(predicate::str::contains("snapshot"))
        .stdout(predicate::str::contains("status"));
}

#[test]
fn missing_subcommand_shows_usage() {
    idebox()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn build_requires_ide_type() {
    idebox()
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<IDE>"));
}

#[test]
fn snapshot_requires_name() {
    idebox()
        .args(["snapshot", "foo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("<NAME>"));
}

#[test]
fn provider_value_is_validated() {
    idebox()
        .args(["--provider", "lxc", "status", "foo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("possible values"));
}

#[test]
fn start_help_shows_runtime_flags() {
    idebox()
        .args(["start", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--web-port"))
        .stdout(predicate::str::contains("--vnc-port"))
        .stdout(predicate::str::contains("--mount"));
}
