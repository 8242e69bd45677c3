use assert_cmd::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Command;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Binary run from an empty directory with an explicit config file.
fn tabpilot(dir: &tempfile::TempDir, yaml: &str) -> Command {
    let config = dir.path().join("config.yaml");
    std::fs::write(&config, yaml).unwrap();
    let mut cmd = Command::cargo_bin("tabpilot").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("TABPILOT_REASONING_URL")
        .env_remove("TABPILOT_MAX_STEPS")
        .env_remove("TABPILOT_STEP_PACING_MS")
        .env("RUST_LOG", "warn")
        .arg("--config")
        .arg(&config);
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let assert = cmd.assert().success();
    String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 output")
}

#[test]
fn config_show_prints_effective_yaml() {
    let dir = tempfile::tempdir().unwrap();
    let stdout = stdout_of(tabpilot(&dir, "agent:\n  max_steps: 7\n").args(["config", "show"]));
    assert!(stdout.contains("max_steps: 7"), "{stdout}");
    assert!(stdout.contains("origin: tabpilot"), "{stdout}");
    assert!(stdout.contains("run_policy: serialize"), "{stdout}");
}

#[test]
fn config_get_sees_env_override() {
    let dir = tempfile::tempdir().unwrap();
    let stdout = stdout_of(
        tabpilot(&dir, "agent:\n  max_steps: 7\n")
            .env("TABPILOT_MAX_STEPS", "4")
            .args(["config", "get", "agent.max_steps"]),
    );
    assert_eq!(stdout.trim(), "4");
}

#[test]
fn config_get_unknown_key_fails() {
    let dir = tempfile::tempdir().unwrap();
    tabpilot(&dir, "{}\n")
        .args(["config", "get", "agent.nope"])
        .assert()
        .failure();
}

#[test]
fn config_validate_rejects_zero_steps() {
    let dir = tempfile::tempdir().unwrap();
    tabpilot(&dir, "agent:\n  max_steps: 0\n")
        .args(["config", "validate"])
        .assert()
        .failure();
}

#[test]
fn dry_run_reports_json() {
    let dir = tempfile::tempdir().unwrap();
    let page = fixture("weather.md");
    let stdout = stdout_of(tabpilot(&dir, "reasoning:\n  mock: true\n").args([
        "--output",
        "json",
        "run",
        "--fast",
        "--prompt",
        "find the forecast",
        "--page",
        page.to_str().unwrap(),
        "--url",
        "https://weather.test/paris",
    ]));

    let report: Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(report["outcome"], "completed");
    assert_eq!(
        report["final_message"],
        "find the forecast: see # Weather in Paris"
    );
    assert_eq!(report["reasoning_calls"], 3);
    assert_eq!(report["executions"], 3);
    assert_eq!(report["total_tokens"], 45);
}

#[test]
fn dry_run_stops_at_step_cap() {
    let dir = tempfile::tempdir().unwrap();
    let page = fixture("weather.md");
    let stdout = stdout_of(
        tabpilot(&dir, "agent:\n  max_steps: 1\n")
            .env("TABPILOT_STEP_PACING_MS", "0")
            .args([
                "--output",
                "json",
                "run",
                "--mock",
                "--prompt",
                "find the forecast",
                "--page",
                page.to_str().unwrap(),
            ]),
    );

    let report: Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(report["outcome"], "max_steps_reached");
    assert_eq!(report["final_message"], "Max steps reached");
    assert_eq!(report["steps"], 1);
}

#[test]
fn missing_page_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    tabpilot(&dir, "reasoning:\n  mock: true\n")
        .args(["run", "--fast", "--prompt", "x", "--page", "missing.md"])
        .assert()
        .failure();
}

#[test]
fn human_run_prints_closing_notice() {
    let dir = tempfile::tempdir().unwrap();
    let page = fixture("weather.md");
    let assert = tabpilot(&dir, "reasoning:\n  mock: true\n")
        .args([
            "run",
            "--fast",
            "--prompt",
            "find the forecast",
            "--page",
            page.to_str().unwrap(),
        ])
        .assert()
        .success();

    let stderr = String::from_utf8(assert.get_output().stderr.clone()).expect("utf8 output");
    assert!(
        stderr.contains("> [DONE] find the forecast: see # Weather in Paris"),
        "{stderr}"
    );
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 output");
    assert!(stdout.contains("Outcome:         Completed"), "{stdout}");
}
