use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const STREAM: &str = r#"{"type":"start"}
{"type":"chunk","text":"Hello"}

{"type":"chunk","text":" World"}
{"type":"repliesFinished"}
{"type":"buildInfo","path":"src/lib.rs","numTokens":3,"finished":false}
{"type":"buildInfo","path":"src/lib.rs","numTokens":9,"finished":true}
{"type":"buildInfo","path":"src/main.rs","numTokens":2,"finished":false,"error":"conflict"}
{"type":"finished"}
"#;

/// Helper function to create a temporary directory for CLI tests
fn create_cli_test_environment() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

fn write_stream(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("stream.jsonl");
    fs::write(&path, contents).expect("Failed to write stream file");
    path
}

/// Helper function to create a Command with --no-color flag and an isolated
/// config home
fn plancast_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("plancast").expect("Failed to find plancast binary");
    cmd.env("XDG_CONFIG_HOME", dir.path()).arg("--no-color");
    cmd
}

#[test]
fn test_cli_replay_fans_out_to_every_subscriber() {
    let temp_dir = create_cli_test_environment();
    let stream = write_stream(&temp_dir, STREAM);

    plancast_cmd(&temp_dir)
        .args(["replay", "--subscribers", "2", "--plan-id", "job-7"])
        .arg(&stream)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"[subscriber 1] {"type":"chunk","text":"Hello"}"#,
        ))
        .stdout(predicate::str::contains(
            r#"[subscriber 2] {"type":"chunk","text":"Hello"}"#,
        ))
        .stdout(predicate::str::contains(r#"[subscriber 2] {"type":"finished"}"#))
        .stdout(predicate::str::contains("# Plan job-7 (main)"))
        .stdout(predicate::str::contains("Hello World"))
        .stdout(predicate::str::contains("- Replies finished"))
        .stdout(predicate::str::contains("`src/lib.rs`: ✓ Success (1/1 succeeded)"))
        .stdout(predicate::str::contains("`src/main.rs`: ✗ Failed: conflict"))
        .stdout(predicate::str::contains("Success: plan job-7 finished"));
}

#[test]
fn test_cli_replay_alias_and_stdin() {
    let temp_dir = create_cli_test_environment();

    plancast_cmd(&temp_dir)
        .args(["r", "-"])
        .write_stdin("{\"type\":\"chunk\",\"text\":\"piped\"}\n{\"type\":\"finished\"}\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"[subscriber 1] {"type":"chunk","text":"piped"}"#,
        ))
        .stdout(predicate::str::contains("No builds registered."));
}

#[test]
fn test_cli_replay_without_finished_is_cancelled() {
    let temp_dir = create_cli_test_environment();
    let stream = write_stream(&temp_dir, "{\"type\":\"chunk\",\"text\":\"partial\"}\n");

    plancast_cmd(&temp_dir)
        .arg("replay")
        .arg(&stream)
        .assert()
        .success()
        .stdout(predicate::str::contains("- Stream: cancelled"))
        .stdout(predicate::str::contains("Success: plan local was cancelled"));
}

#[test]
fn test_cli_replay_rejects_malformed_line() {
    let temp_dir = create_cli_test_environment();
    let stream = write_stream(&temp_dir, "{\"type\":\"start\"}\nnot json\n");

    plancast_cmd(&temp_dir)
        .arg("replay")
        .arg(&stream)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn test_cli_replay_missing_file() {
    let temp_dir = create_cli_test_environment();

    plancast_cmd(&temp_dir)
        .args(["replay", "does-not-exist.jsonl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open stream file"));
}

#[test]
fn test_cli_demo_stops_delivery_after_unsubscribe() {
    let temp_dir = create_cli_test_environment();

    plancast_cmd(&temp_dir)
        .args(["demo", "--plan-id", "p1", "--prompt", "say hello"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"[A] {"type":"chunk","text":"Hello"}"#))
        .stdout(predicate::str::contains(r#"[B] {"type":"chunk","text":"Hello"}"#))
        .stdout(predicate::str::contains(r#"[A] {"type":"chunk","text":"World"}"#))
        .stdout(predicate::str::contains(r#"[B] {"type":"chunk","text":"World"}"#).not())
        .stdout(predicate::str::contains(r#"[A] {"type":"finished"}"#))
        .stdout(predicate::str::contains("> say hello"))
        .stdout(predicate::str::contains("HelloWorld"))
        .stdout(predicate::str::contains("Success: plan p1 finished"));
}

#[test]
fn test_cli_rejects_zero_capacity() {
    let temp_dir = create_cli_test_environment();

    plancast_cmd(&temp_dir)
        .args(["--subscriber-capacity", "0", "demo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("subscriber_capacity"));
}

#[test]
fn test_cli_rejects_oversized_capacity() {
    let temp_dir = create_cli_test_environment();

    plancast_cmd(&temp_dir)
        .args(["--intake-capacity", "9223372036854775807", "demo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("intake_capacity"))
        .stderr(predicate::str::contains("panicked").not());
}

#[test]
fn test_cli_reads_config_file() {
    let temp_dir = create_cli_test_environment();
    let config = temp_dir.path().join("custom.json");
    fs::write(&config, r#"{"intake_capacity": 0}"#).expect("Failed to write config");

    plancast_cmd(&temp_dir)
        .arg("--config")
        .arg(&config)
        .arg("demo")
        .assert()
        .failure()
        .stderr(predicate::str::contains("intake_capacity"));

    fs::write(&config, r#"{"subscriber_capacity": 4}"#).expect("Failed to write config");
    plancast_cmd(&temp_dir)
        .arg("--config")
        .arg(&config)
        .arg("demo")
        .assert()
        .success();
}

#[test]
fn test_cli_default_config_location() {
    let temp_dir = create_cli_test_environment();
    let dir = temp_dir.path().join("plancast");
    fs::create_dir_all(&dir).expect("Failed to create config dir");
    fs::write(dir.join("config.json"), "not json").expect("Failed to write config");

    plancast_cmd(&temp_dir)
        .arg("demo")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}

#[test]
fn test_cli_help() {
    let temp_dir = create_cli_test_environment();

    plancast_cmd(&temp_dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("replay"))
        .stdout(predicate::str::contains("demo"));
}
