//! Integration tests for the `ledstrip` CLI binary.
//!
//! These tests validate argument parsing, help output, shell completions,
//! conversions, the simulator, and profile management, all against the
//! in-memory strip.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `ledstrip` binary with env isolation.
///
/// Clears all `LEDSTRIP_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn ledstrip_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("ledstrip");
    cmd.env("HOME", "/tmp/ledstrip-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/ledstrip-cli-test-nonexistent")
        .env_remove("LEDSTRIP_PROFILE")
        .env_remove("LEDSTRIP_CONFIG")
        .env_remove("LEDSTRIP_OUTPUT")
        .env_remove("LEDSTRIP_DEFAULT_PROFILE")
        .env_remove("LEDSTRIP_DEFAULTS__COLOR_CORRECTION")
        .env_remove("RUST_LOG");
    cmd
}

/// Same as [`ledstrip_cmd`], with `--config` pointing at `path`.
fn with_config(path: &Path) -> assert_cmd::Command {
    let mut cmd = ledstrip_cmd();
    cmd.arg("--config").arg(path);
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn stdout_json(cmd: &mut assert_cmd::Command) -> Value {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed:\n{}",
        combined_output(&output)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = ledstrip_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    ledstrip_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("effects")
            .and(predicate::str::contains("convert"))
            .and(predicate::str::contains("simulate"))
            .and(predicate::str::contains("config")),
    );
}

#[test]
fn test_version_flag() {
    ledstrip_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ledstrip"));
}

#[test]
fn test_invalid_subcommand() {
    let output = ledstrip_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_invalid_output_format() {
    let output = ledstrip_cmd()
        .args(["--output", "invalid", "effects"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about valid output formats:\n{text}"
    );
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    ledstrip_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    ledstrip_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Effects & conversions ───────────────────────────────────────────

#[test]
fn test_effects_plain_lists_every_name() {
    let output = ledstrip_cmd()
        .args(["effects", "-o", "plain"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let names: Vec<&str> = stdout.lines().collect();
    assert_eq!(names.len(), 25);
    assert_eq!(names[0], "off");
    assert_eq!(names[24], "strobe_all");
}

#[test]
fn test_effects_json_carries_codes() {
    let json = stdout_json(ledstrip_cmd().args(["effects", "-o", "json"]));
    let effects = json.as_array().unwrap();
    assert_eq!(effects[0]["name"], "off");
    assert!(effects[0]["code"].is_null());
    assert_eq!(effects[5]["name"], "blink_red");
    assert_eq!(effects[5]["code"], 11);
}

#[test]
fn test_convert_effect_name_to_code() {
    ledstrip_cmd()
        .args(["convert", "effect", "--name", "blink_red", "-o", "plain"])
        .assert()
        .success()
        .stdout("11\n");
}

#[test]
fn test_convert_reserved_code_is_off() {
    ledstrip_cmd()
        .args(["convert", "effect", "--code", "3", "-o", "plain"])
        .assert()
        .success()
        .stdout("off\n");
}

#[test]
fn test_convert_unknown_effect_name() {
    ledstrip_cmd()
        .args(["convert", "effect", "--name", "disco"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown effect"));
}

#[test]
fn test_convert_effect_rejects_both_inputs() {
    ledstrip_cmd()
        .args(["convert", "effect", "--code", "11", "--name", "blink_red"])
        .assert()
        .failure();
}

#[test]
fn test_convert_brightness_both_ways() {
    ledstrip_cmd()
        .args(["convert", "brightness", "--native", "50", "-o", "plain"])
        .assert()
        .success()
        .stdout("128\n");

    ledstrip_cmd()
        .args(["convert", "brightness", "--presentation", "128", "-o", "plain"])
        .assert()
        .success()
        .stdout("50\n");
}

#[test]
fn test_convert_brightness_out_of_range() {
    ledstrip_cmd()
        .args(["convert", "brightness", "--native", "101"])
        .assert()
        .failure();
}

// ── Simulator ───────────────────────────────────────────────────────

#[test]
fn test_simulate_default_session() {
    let json = stdout_json(ledstrip_cmd().args(["simulate", "-o", "json"]));

    assert_eq!(json["address"], "C0:FF:EE:00:00:01");
    assert_eq!(json["lifecycle"], "stopped");
    assert_eq!(json["disconnects"], 1);

    let commands: Vec<&str> = json["commands"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["command"].as_str().unwrap())
        .collect();
    assert_eq!(
        commands,
        ["set_power", "set_brightness", "set_effect", "set_color", "set_power"]
    );

    let versions: Vec<u64> = json["snapshots"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["version"].as_u64().unwrap())
        .collect();
    assert!(versions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_simulate_absent_strip() {
    let json = stdout_json(ledstrip_cmd().args([
        "simulate",
        "--absent",
        "--rssi",
        "-72",
        "-o",
        "json",
    ]));

    let steps = json["steps"].as_array().unwrap();
    assert!(
        steps[1]["outcome"]
            .as_str()
            .unwrap()
            .starts_with("rejected")
    );
    let snapshots = json["snapshots"].as_array().unwrap();
    assert_eq!(snapshots[0]["connected"], false);
    assert_eq!(snapshots.last().unwrap()["rssi"], -72);
}

#[test]
fn test_simulate_table_output() {
    ledstrip_cmd()
        .args(["simulate", "--effect", "blink_red"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Snapshots")
                .and(predicate::str::contains("blink_red"))
                .and(predicate::str::contains("Lifecycle: stopped")),
        );
}

#[test]
fn test_simulate_bad_address() {
    ledstrip_cmd()
        .args(["simulate", "--address", "not-an-address"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("address"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_show_no_config() {
    ledstrip_cmd().args(["config", "show"]).assert().success();
}

#[test]
fn test_config_path_honors_flag() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    with_config(&path)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("custom.toml"));
}

#[test]
fn test_profiles_drive_simulation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    with_config(&path)
        .args([
            "config",
            "add-device",
            "desk",
            "--address",
            "aa-bb-cc-dd-12-34",
            "--color-correction",
            "false",
        ])
        .assert()
        .success();
    assert!(path.exists());

    with_config(&path)
        .args(["config", "profiles", "-o", "plain"])
        .assert()
        .success()
        .stdout("desk\n");

    let json = stdout_json(with_config(&path).args(["simulate", "-o", "json"]));
    assert_eq!(json["address"], "AA:BB:CC:DD:12:34");
    assert_eq!(json["title"], "LED Strip 1234");
    assert_eq!(json["color_correction"], false);
}

#[test]
fn test_set_default_unknown_profile() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    with_config(&path)
        .args(["config", "set-default", "shelf"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("shelf"));
}

#[test]
fn test_unknown_profile_for_simulation() {
    ledstrip_cmd()
        .args(["--profile", "nowhere", "simulate"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("nowhere"));
}
