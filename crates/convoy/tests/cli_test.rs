#![allow(deprecated)] // TODO: cargo_bin → cargo_bin_cmd! へ移行

use assert_cmd::Command;
use predicates::prelude::*;

/// CLIヘルプが正しく表示されることを確認
#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("convoy").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("dev"))
        .stdout(predicate::str::contains("prod"))
        .stdout(predicate::str::contains("doctor"));
}

/// バージョン表示が正しく動作することを確認
#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("convoy").unwrap();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("convoy"));
}

/// dev up のフラグが公開されていることを確認
#[test]
fn test_dev_up_help() {
    let mut cmd = Command::cargo_bin("convoy").unwrap();
    cmd.args(["dev", "up", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--pull"))
        .stdout(predicate::str::contains("--file"));
}

/// prod deploy のフラグが公開されていることを確認
#[test]
fn test_prod_deploy_help() {
    let mut cmd = Command::cargo_bin("convoy").unwrap();
    cmd.args(["prod", "deploy", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--tag"))
        .stdout(predicate::str::contains("--no-pull"))
        .stdout(predicate::str::contains("--dry-run"));
}

/// prod rollback のフラグが公開されていることを確認
#[test]
fn test_prod_rollback_help() {
    let mut cmd = Command::cargo_bin("convoy").unwrap();
    cmd.args(["prod", "rollback", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"));
}

/// logs のフラグが公開されていることを確認
#[test]
fn test_dev_logs_help() {
    let mut cmd = Command::cargo_bin("convoy").unwrap();
    cmd.args(["dev", "logs", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--follow"))
        .stdout(predicate::str::contains("--lines"));
}

/// タグ未指定のデプロイは設定エラーとして即座に失敗することを確認
#[test]
fn test_prod_deploy_requires_tag() {
    let tmp = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("convoy").unwrap();
    cmd.current_dir(tmp.path())
        .env_remove("IMAGE_TAG")
        .args(["prod", "deploy"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("タグ"));
}
