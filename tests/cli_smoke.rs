use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn help_lists_both_modes() {
    Command::cargo_bin("taskpal")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("chat").and(predicate::str::contains("mcp")));
}

#[test]
fn unknown_subcommand_fails() {
    Command::cargo_bin("taskpal")
        .unwrap()
        .arg("frobnicate")
        .assert()
        .failure();
}

#[test]
fn chat_without_api_key_is_a_fatal_startup_error() {
    let temp_dir = TempDir::new().unwrap();

    Command::cargo_bin("taskpal")
        .unwrap()
        .arg("chat")
        .current_dir(temp_dir.path())
        .env_remove("TASKPAL_API_KEY")
        .env("TASKPAL_DB", temp_dir.path().join("tasks.db"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("TASKPAL_API_KEY"));
}
