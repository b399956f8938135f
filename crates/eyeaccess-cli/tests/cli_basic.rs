//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run and verify outputs.

use std::io::Write;
use std::process::{Command, Stdio};

/// Run a CLI command and return output.
fn run_cli(args: &[&str]) -> (i32, String, String) {
    let output = Command::new("cargo")
        .args(["run", "-q", "-p", "eyeaccess-cli", "--"])
        .args(args)
        .env("EYEACCESS_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

/// Run the shell with `script` on stdin and return its stdout lines.
fn run_shell(extra_args: &[&str], script: &str) -> Vec<serde_json::Value> {
    let mut child = Command::new("cargo")
        .args(["run", "-q", "-p", "eyeaccess-cli", "--", "shell"])
        .args(extra_args)
        .env("EYEACCESS_ENV", "dev")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn shell");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(script.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success(), "shell failed: {}", String::from_utf8_lossy(&output.stderr));

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("shell output is JSON"))
        .collect()
}

#[test]
fn test_config_list() {
    let (code, stdout, _) = run_cli(&["config", "list"]);
    assert_eq!(code, 0, "config list failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(parsed["preferences"].is_object());
    assert!(parsed["tracking"]["sample_interval_ms"].is_number());
}

#[test]
fn test_config_get_unknown_key_fails() {
    let (code, _, stderr) = run_cli(&["config", "get", "nope.nothing"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_demo_is_reproducible() {
    let args = ["demo", "--seed", "7", "--samples", "10"];
    let (code, first, _) = run_cli(&args);
    assert_eq!(code, 0, "demo failed");
    let (_, second, _) = run_cli(&args);

    let first: serde_json::Value = serde_json::from_str(&first).unwrap();
    let second: serde_json::Value = serde_json::from_str(&second).unwrap();
    assert_eq!(first["gaze"].as_array().unwrap().len(), 10);
    assert_eq!(first["gaze"], second["gaze"]);
    assert_eq!(first["snapshot"]["calibration"]["state"], "complete");
    assert_eq!(first["snapshot"]["active"], false);
}

#[test]
fn test_shell_session() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let config = config.to_str().unwrap();

    let script = "activate\n\
                  calibrate\n\
                  skip\n\
                  answer confirm_skip\n\
                  activate\n\
                  stop\n\
                  toggle haptic\n\
                  quit\n";
    let replies: Vec<_> = run_shell(&["--config", config, "--seed", "1"], script)
        .into_iter()
        .filter(|v| v.get("tick").is_none())
        .collect();

    assert_eq!(replies[0]["prompt"]["title"], "Calibration Required");
    assert_eq!(replies[1]["events"][0]["type"], "calibration_started");
    assert_eq!(replies[2]["prompt"]["title"], "Skip Calibration");
    assert_eq!(replies[3]["events"][0]["type"], "calibration_skipped");
    assert_eq!(replies[4]["events"][0]["type"], "control_activated");
    assert_eq!(replies[5]["events"][0]["type"], "emergency_stop");
    assert_eq!(replies[6]["toggle"], "haptic");
}
