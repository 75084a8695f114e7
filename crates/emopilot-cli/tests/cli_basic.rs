//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against a throwaway data directory
//! and verify outputs.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-q", "-p", "emopilot-cli", "--"])
        .args(args)
        .env("EMOPILOT_DATA_DIR", data_dir)
        .env_remove("EMOPILOT_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_cli_success(data_dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "CLI command failed: {args:?}\n{stderr}");
    stdout
}

#[test]
fn test_mission_run_reports_summary() {
    let dir = tempfile::tempdir().unwrap();
    let stdout = run_cli_success(
        dir.path(),
        &["mission", "run", "--location", "home", "--seed", "7"],
    );
    let summary: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(summary["location"], "home");
    assert_eq!(summary["rounds"], 5);
    assert_eq!(summary["missed"], 0);
    assert_eq!(summary["score"], 130);
}

#[test]
fn test_mission_run_persists_xp() {
    let dir = tempfile::tempdir().unwrap();
    let stdout = run_cli_success(
        dir.path(),
        &["mission", "run", "--seed", "3", "--count", "1"],
    );
    let summary: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    // one boss: correct decision plus its report
    assert_eq!(summary["xp"], 15);

    let shown = run_cli_success(dir.path(), &["xp", "show"]);
    assert_eq!(shown.trim(), "15");

    run_cli_success(dir.path(), &["xp", "reset"]);
    let shown = run_cli_success(dir.path(), &["xp", "show"]);
    assert_eq!(shown.trim(), "0");
}

#[test]
fn test_mission_run_events_are_json_lines() {
    let dir = tempfile::tempdir().unwrap();
    let stdout = run_cli_success(
        dir.path(),
        &[
            "mission", "run", "--seed", "11", "--ephemeral", "--events",
            "--set", "enable_breath=false",
        ],
    );
    let first = stdout.lines().next().unwrap();
    let event: serde_json::Value = serde_json::from_str(first).unwrap();
    assert_eq!(event["type"], "MissionStarted");
    assert!(stdout.contains("\"type\":\"DeckCommitted\""));
    assert!(!stdout.contains("BreathPhaseChanged"));
}

#[test]
fn test_mission_run_with_uneven_tick_rate() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["config", "set", "timing.tick_ms", "30"]);
    let stdout = run_cli_success(
        dir.path(),
        &["mission", "run", "--seed", "7", "--ephemeral", "--location", "school"],
    );
    let summary: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(summary["rounds"], 5);
    assert_eq!(summary["missed"], 0);
    assert!(summary["reports"].as_u64().unwrap() >= 1);
}

#[test]
fn test_mission_run_rejects_bad_setting() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(
        dir.path(),
        &["mission", "run", "--ephemeral", "--set", "volume=3"],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_deck_build_json() {
    let dir = tempfile::tempdir().unwrap();
    let stdout = run_cli_success(
        dir.path(),
        &["deck", "build", "--location", "playground", "--count", "9", "--seed", "1", "--json"],
    );
    let deck: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let cards = deck["cards"].as_array().unwrap();
    assert_eq!(cards.len(), 9);
    assert_eq!(cards.iter().filter(|c| c["is_boss"] == true).count(), 1);
}

#[test]
fn test_cards_list_and_report_options() {
    let dir = tempfile::tempdir().unwrap();
    let stdout = run_cli_success(dir.path(), &["cards", "list", "--location", "school"]);
    assert_eq!(stdout.lines().count(), 15);

    let stdout = run_cli_success(dir.path(), &["cards", "list", "--bosses"]);
    assert!(stdout.lines().all(|l| l.contains("[boss]")));

    let stdout = run_cli_success(dir.path(), &["cards", "emotions"]);
    assert!(stdout.contains("scared"));
    let stdout = run_cli_success(dir.path(), &["cards", "needs"]);
    assert!(stdout.contains("water"));
}

#[test]
fn test_config_set_get_reset() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["config", "set", "mission.card_count", "40"]);
    let value = run_cli_success(dir.path(), &["config", "get", "mission.card_count"]);
    assert_eq!(value.trim(), "15");

    let (_, _, code) = run_cli(dir.path(), &["config", "get", "mission.nope"]);
    assert_ne!(code, 0);

    run_cli_success(dir.path(), &["config", "reset"]);
    let value = run_cli_success(dir.path(), &["config", "get", "mission.card_count"]);
    assert_eq!(value.trim(), "5");
}

#[test]
fn test_config_list_and_path() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["config", "set", "mission.breath_cycles", "6"]);
    let stdout = run_cli_success(dir.path(), &["config", "list"]);
    assert!(stdout.lines().any(|l| l == "mission.breath_cycles = 6"));
    assert!(stdout.lines().any(|l| l == "timing.tick_ms = 40"));

    let stdout = run_cli_success(dir.path(), &["config", "list", "--defaults"]);
    assert!(stdout.lines().any(|l| l == "mission.breath_cycles = 3"));

    let stdout = run_cli_success(dir.path(), &["config", "path"]);
    assert!(stdout.trim().ends_with("config.toml"));
}
