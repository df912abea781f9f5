//! End-to-end tests against the compiled `mgit` binary.

use assert_cmd::Command;
use predicates::str::contains;

#[test]
fn rejects_invalid_query_with_exit_code_two() {
    let mut cmd = Command::cargo_bin("mgit").unwrap();
    cmd.args(["list", "only-one-segment"])
        .assert()
        .code(2)
        .stderr(contains("invalid query"));
}

#[test]
fn list_with_missing_explicit_config_path_is_a_config_error() {
    let temp = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("mgit").unwrap();
    cmd.env("MGIT_CONFIG", "")
        .args(["--config", temp.path().join("absent.yaml").to_str().unwrap()])
        .args(["list", "acme/*/*"])
        .assert()
        .code(2)
        .stderr(contains("configuration error"));
}

#[test]
fn status_rejects_zero_concurrency_with_exit_code_two() {
    let temp = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("mgit").unwrap();
    cmd.args(["status", temp.path().to_str().unwrap(), "--concurrency", "0"])
        .assert()
        .code(2)
        .stderr(contains("concurrency must be a positive integer"));
}

#[test]
fn help_lists_all_subcommands() {
    let mut cmd = Command::cargo_bin("mgit").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(contains("list"))
        .stdout(contains("sync"))
        .stdout(contains("status"))
        .stdout(contains("completions"));
}
