//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against the dev data
//! directory and verify outputs.

use std::process::Command;
use std::sync::Mutex;

/// Timer state is shared through the kv store, so timer tests must not
/// interleave.
static TIMER_LOCK: Mutex<()> = Mutex::new(());

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "mindful-cli", "--"])
        .args(args)
        .env("MINDFUL_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_timer_status() {
    let _guard = TIMER_LOCK.lock().unwrap();
    let _ = run_cli(&["timer", "reset"]);
    let (stdout, _, code) = run_cli(&["timer", "status"]);
    assert_eq!(code, 0, "Timer status failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("status is JSON");
    assert_eq!(parsed["type"], "StateSnapshot");
}

#[test]
fn test_timer_set_clamps_duration() {
    let _guard = TIMER_LOCK.lock().unwrap();
    let _ = run_cli(&["timer", "reset"]);
    let (stdout, _, code) = run_cli(&["timer", "set", "500"]);
    assert_eq!(code, 0, "Timer set failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("event is JSON");
    assert_eq!(parsed["type"], "DurationChanged");
    assert_eq!(parsed["minutes"], 180);

    let _ = run_cli(&["timer", "reset"]);
}

#[test]
fn test_timer_start_then_pause() {
    let _guard = TIMER_LOCK.lock().unwrap();
    let _ = run_cli(&["timer", "reset"]);
    let (stdout, _, code) = run_cli(&["timer", "start"]);
    assert_eq!(code, 0, "Timer start failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("event is JSON");
    assert_eq!(parsed["type"], "TimerStarted");

    let (stdout, _, code) = run_cli(&["timer", "pause"]);
    assert_eq!(code, 0, "Timer pause failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("event is JSON");
    assert_eq!(parsed["type"], "TimerPaused");

    let _ = run_cli(&["timer", "reset"]);
}

#[test]
fn test_timer_reset() {
    let _guard = TIMER_LOCK.lock().unwrap();
    let _ = run_cli(&["timer", "reset"]);
    let (stdout, _, code) = run_cli(&["timer", "reset"]);
    assert_eq!(code, 0, "Timer reset failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("event is JSON");
    assert_eq!(parsed["type"], "TimerReset");
}

#[test]
fn test_config_get() {
    let (stdout, _, code) = run_cli(&["config", "get", "sound.enabled"]);
    assert_eq!(code, 0, "Config get failed");
    assert!(stdout.trim() == "true" || stdout.trim() == "false");
}

#[test]
fn test_config_set() {
    let (_, _, code) = run_cli(&["config", "set", "ui.show_quote", "true"]);
    assert_eq!(code, 0, "Config set failed");
    let (stdout, _, _) = run_cli(&["config", "get", "ui.show_quote"]);
    assert_eq!(stdout.trim(), "true");
}

#[test]
fn test_config_list() {
    let (stdout, _, code) = run_cli(&["config", "list"]);
    assert_eq!(code, 0, "Config list failed");
    assert!(stdout.contains("[sound]"));
    assert!(stdout.contains("[ui]"));
}

#[test]
fn test_config_get_unknown_key_fails() {
    let (_, _, code) = run_cli(&["config", "get", "sound.nope"]);
    assert_ne!(code, 0);
}

#[test]
fn test_stats_show() {
    let (stdout, _, code) = run_cli(&["stats", "show"]);
    assert_eq!(code, 0, "Stats show failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("stats is JSON");
    assert!(parsed["total_sessions"].is_number());
    assert!(parsed["current_streak"].is_number());
}

#[test]
fn test_stats_sessions() {
    let (stdout, _, code) = run_cli(&["stats", "sessions"]);
    assert_eq!(code, 0, "Stats sessions failed");
    stdout.trim().parse::<u64>().expect("session count is a number");
}

#[test]
fn test_sound_list() {
    let (stdout, _, code) = run_cli(&["sound", "list"]);
    assert_eq!(code, 0, "Sound list failed");
    assert!(stdout.contains("Singing Bowl"));
    assert!(stdout.contains("Ocean Waves"));
}
