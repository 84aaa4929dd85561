//! Behavioural smoke test for the CLI entrypoint.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;

#[test]
fn cli_without_arguments_prints_help() {
    let mut cmd = cargo_bin_cmd!("volwright");
    cmd.assert().failure().stderr(contains("Usage"));
}

#[test]
fn cli_help_lists_subcommands() {
    let mut cmd = cargo_bin_cmd!("volwright");
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(contains("create"))
        .stdout(contains("set-description"));
}
