// crates/labwait-cli/tests/wait_command.rs
// ============================================================================
// Module: CLI Wait Command Tests
// Description: End-to-end runs of the labwait binary.
// Purpose: Pin the JSON summary line and exit code contract.
// Dependencies: labwait-cli binary, serde_json, tempfile
// ============================================================================

//! ## Overview
//! Spawns the built `labwait` binary with a scrubbed `LABWAIT_*` environment
//! and checks stdout, stderr, and exit status.

#![cfg(unix)]
#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::process::Command;
use std::process::Output;

use serde_json::Value;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn labwait(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_labwait"))
        .args(args)
        .env_remove("LABWAIT_CONFIG")
        .env_remove("LABWAIT_TIMEOUT_SEC")
        .env_remove("LABWAIT_LANG")
        .env_remove("LABWAIT_LOG")
        .output()
        .expect("run labwait")
}

fn summary(output: &Output) -> Value {
    let stdout = String::from_utf8(output.stdout.clone()).expect("utf-8 stdout");
    let mut lines = stdout.lines();
    let line = lines.next().expect("summary line");
    assert!(lines.next().is_none(), "stdout must hold exactly one line: {stdout}");
    serde_json::from_str(line).expect("summary is JSON")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("utf-8 temp path")
}

// ============================================================================
// SECTION: Command Waits
// ============================================================================

#[test]
fn satisfied_command_exits_zero() {
    let output = labwait(&["command", "--timeout-ms", "2000", "--", "sh", "-c", "exit 0"]);

    assert_eq!(output.status.code(), Some(0));
    let summary = summary(&output);
    assert_eq!(summary["status"], "satisfied");
    assert_eq!(summary["attempts"], 1);
    assert_eq!(summary["description"], "sh -c exit 0");
}

#[test]
fn stdout_expectation_and_env_reach_command() {
    let output = labwait(&[
        "command",
        "--expect-stdout",
        "device",
        "--env",
        "PROBE_STATE=device",
        "--timeout-ms",
        "2000",
        "--",
        "sh",
        "-c",
        "echo \"$PROBE_STATE\"",
    ]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(summary(&output)["status"], "satisfied");
}

#[test]
fn timed_out_command_exits_two() {
    let output = labwait(&[
        "command",
        "--timeout-ms",
        "60",
        "--interval-ms",
        "20",
        "--description",
        "never ready",
        "--",
        "sh",
        "-c",
        "exit 1",
    ]);

    assert_eq!(output.status.code(), Some(2));
    let summary = summary(&output);
    assert_eq!(summary["status"], "timed_out");
    assert_eq!(summary["description"], "never ready");
    assert!(summary["attempts"].as_u64().expect("attempts") >= 2);
    assert!(summary["elapsed_ms"].as_u64().expect("elapsed") >= 60);
    assert!(stderr(&output).contains("timed out waiting for never ready"));
}

#[test]
fn missing_program_aborts_with_exit_one() {
    let output = labwait(&["command", "--timeout-ms", "5000", "--", "labwait-no-such-program"]);

    assert_eq!(output.status.code(), Some(1));
    let summary = summary(&output);
    assert_eq!(summary["status"], "failed");
    assert!(summary.get("attempts").is_none());
    assert!(summary["error"].as_str().expect("error").contains("labwait-no-such-program"));
}

#[test]
fn tolerant_missing_program_times_out_with_last_error() {
    let output = labwait(&[
        "command",
        "--tolerant",
        "--timeout-ms",
        "50",
        "--interval-ms",
        "10",
        "--",
        "labwait-no-such-program",
    ]);

    assert_eq!(output.status.code(), Some(2));
    let summary = summary(&output);
    assert_eq!(summary["status"], "timed_out");
    assert!(summary["error"].as_str().expect("last error").contains("failed to spawn"));
}

// ============================================================================
// SECTION: Path Waits
// ============================================================================

#[test]
fn path_wait_for_existing_and_absent_paths() {
    let dir = tempfile::tempdir().expect("tempdir");
    let present = dir.path().join("present");
    fs::write(&present, "ready\n").expect("write file");
    let missing = dir.path().join("missing");

    let exists = labwait(&["path", path_arg(&present), "--timeout-ms", "100"]);
    assert_eq!(exists.status.code(), Some(0));

    let absent = labwait(&["path", path_arg(&missing), "--absent", "--timeout-ms", "100"]);
    assert_eq!(absent.status.code(), Some(0));

    let first_line = labwait(&["path", path_arg(&present), "--first-line", "ready"]);
    assert_eq!(first_line.status.code(), Some(0));
    assert_eq!(summary(&first_line)["attempts"], 1);
}

#[test]
fn path_wait_times_out_for_missing_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("labd.sock");

    let output =
        labwait(&["path", path_arg(&missing), "--timeout-ms", "40", "--interval-ms", "10"]);

    assert_eq!(output.status.code(), Some(2));
    let description = summary(&output)["description"].as_str().expect("description").to_string();
    assert!(description.ends_with("labd.sock to exist"), "{description}");
}

// ============================================================================
// SECTION: Configured Probes
// ============================================================================

#[test]
fn configured_probe_runs_and_config_validates() {
    let dir = tempfile::tempdir().expect("tempdir");
    let flag = dir.path().join("flag");
    fs::write(&flag, "up\n").expect("write flag");
    let config = dir.path().join("labwait.toml");
    fs::write(
        &config,
        format!(
            "[profiles.quick]\ntimeout_ms = 500\ninterval_ms = 10\n\n[probes.flag]\nkind = \
             \"path\"\nprofile = \"quick\"\npath = \"{}\"\ncheck = {{ first_line_equals = \
             \"up\" }}\n",
            flag.display()
        ),
    )
    .expect("write config");

    let validate = labwait(&["config", "validate", "--config", path_arg(&config)]);
    assert_eq!(validate.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&validate.stdout).contains("1 profiles, 1 probes"));

    let probe = labwait(&["probe", "flag", "--config", path_arg(&config)]);
    assert_eq!(probe.status.code(), Some(0));
    assert_eq!(summary(&probe)["description"], "probe flag");

    let unknown = labwait(&["probe", "nope", "--config", path_arg(&config)]);
    assert_eq!(unknown.status.code(), Some(1));
    assert!(stderr(&unknown).contains("unknown probe: nope"));
}

#[test]
fn invalid_config_fails_validation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("labwait.toml");
    fs::write(&config, "[profiles.fast]\ninterval_ms = 0\n").expect("write config");

    let output = labwait(&["config", "validate", "--config", path_arg(&config)]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("interval_ms must be greater than zero"));
}

// ============================================================================
// SECTION: Global Flags
// ============================================================================

#[test]
fn version_and_catalan_output() {
    let version = labwait(&["--version"]);
    assert_eq!(version.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&version.stdout).starts_with("labwait "));

    let output = labwait(&[
        "--lang",
        "ca",
        "command",
        "--timeout-ms",
        "20",
        "--interval-ms",
        "10",
        "--",
        "sh",
        "-c",
        "exit 1",
    ]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Temps esgotat"));
}

#[test]
fn usage_errors_exit_one_and_help_exits_zero() {
    let bad_number = labwait(&["command", "--timeout-ms", "abc", "--", "true"]);
    assert_eq!(bad_number.status.code(), Some(1));
    assert!(bad_number.stdout.is_empty());
    assert!(stderr(&bad_number).contains("--timeout-ms"));

    let unknown = labwait(&["wait-forever"]);
    assert_eq!(unknown.status.code(), Some(1));

    let help = labwait(&["command", "--help"]);
    assert_eq!(help.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&help.stdout).contains("--expect-stdout"));
}
