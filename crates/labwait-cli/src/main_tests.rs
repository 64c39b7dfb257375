// crates/labwait-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument parsing and wait setting resolution.
// Purpose: Pin flag precedence, profile merging, and locale selection.
// Dependencies: labwait-cli main helpers
// ============================================================================

//! ## Overview
//! Exercises the private helpers behind the `labwait` binary without spawning
//! it: clap parsing, poll setting resolution, and env entry parsing.

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
use std::time::Duration;

use clap::Parser;
use labwait_cli::i18n::Locale;
use labwait_config::EnvConfig;

use super::Cli;
use super::Commands;
use super::LangArg;
use super::PollArgs;
use super::parse_env_entry;
use super::resolve_locale;
use super::resolve_poll_config;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn write_config(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("labwait.toml");
    fs::write(
        &path,
        "[defaults]\ntimeout_ms = 3000\ninterval_ms = 100\n\n[profiles.boot]\ntimeout_ms = \
         60000\ndescription = \"device boot\"\n",
    )
    .expect("write config");
    path
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

#[test]
fn command_wait_parses_trailing_program() {
    let cli = Cli::try_parse_from([
        "labwait",
        "command",
        "--expect-stdout",
        "device",
        "--env",
        "ANDROID_SERIAL=emulator-5554",
        "--timeout-ms",
        "500",
        "--",
        "adb",
        "get-state",
    ])
    .expect("parse command wait");

    let Some(Commands::Command(command)) = cli.command else {
        panic!("expected command subcommand");
    };
    assert_eq!(command.argv, ["adb", "get-state"]);
    assert_eq!(command.expect_stdout.as_deref(), Some("device"));
    assert_eq!(command.env, [("ANDROID_SERIAL".to_string(), "emulator-5554".to_string())]);
    assert_eq!(command.poll.timeout_ms, Some(500));
}

#[test]
fn command_wait_rejects_conflicting_expectations() {
    let result = Cli::try_parse_from([
        "labwait",
        "command",
        "--expect-stdout",
        "a",
        "--expect-nonempty",
        "--",
        "true",
    ]);
    assert!(result.is_err());
}

#[test]
fn command_wait_requires_program() {
    assert!(Cli::try_parse_from(["labwait", "command", "--expect-nonempty"]).is_err());
}

#[test]
fn path_wait_rejects_absent_with_first_line() {
    let result =
        Cli::try_parse_from(["labwait", "path", "/tmp/x", "--absent", "--first-line", "ready"]);
    assert!(result.is_err());
}

#[test]
fn global_lang_flag_parses_after_subcommand() {
    let cli = Cli::try_parse_from(["labwait", "path", "/tmp/x", "--lang", "ca"])
        .expect("parse path wait");
    assert!(matches!(cli.lang, Some(LangArg::Ca)));
}

#[test]
fn env_entry_requires_key_and_equals() {
    assert_eq!(parse_env_entry("A=b=c"), Ok(("A".to_string(), "b=c".to_string())));
    assert_eq!(parse_env_entry("EMPTY="), Ok(("EMPTY".to_string(), String::new())));
    assert!(parse_env_entry("=value").is_err());
    assert!(parse_env_entry("novalue").is_err());
}

// ============================================================================
// SECTION: Locale
// ============================================================================

#[test]
fn locale_prefers_flag_then_env() {
    assert_eq!(resolve_locale(Some(LangArg::En), Some("ca")).expect("flag"), Locale::En);
    assert_eq!(resolve_locale(None, Some("ca_ES")).expect("env"), Locale::Ca);
    assert_eq!(resolve_locale(None, None).expect("default"), Locale::En);
    let err = resolve_locale(None, Some("fr")).expect_err("unsupported");
    assert!(err.to_string().contains("LABWAIT_LANG"));
}

// ============================================================================
// SECTION: Poll Resolution
// ============================================================================

#[test]
fn poll_defaults_without_config() {
    let poll = resolve_poll_config(&PollArgs::default(), &EnvConfig::default(), "x to exist".to_string())
        .expect("resolve defaults");

    assert_eq!(poll.timeout(), Duration::from_secs(10));
    assert_eq!(poll.interval(), Duration::from_secs(1));
    assert_eq!(poll.description(), "x to exist");
}

#[test]
fn poll_flags_override_profile() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_config(&dir);
    let args = PollArgs {
        interval_ms: Some(25),
        profile: Some("boot".to_string()),
        config: Some(path),
        ..PollArgs::default()
    };

    let poll = resolve_poll_config(&args, &EnvConfig::default(), "fallback".to_string())
        .expect("resolve profile");

    assert_eq!(poll.timeout(), Duration::from_secs(60));
    assert_eq!(poll.interval(), Duration::from_millis(25));
    assert_eq!(poll.description(), "device boot");
}

#[test]
fn poll_env_config_path_supplies_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let env = EnvConfig {
        config_path: Some(write_config(&dir)),
        ..EnvConfig::default()
    };

    let poll = resolve_poll_config(&PollArgs::default(), &env, "fallback".to_string())
        .expect("resolve env config");

    assert_eq!(poll.timeout(), Duration::from_secs(3));
    assert_eq!(poll.description(), "fallback");
}

#[test]
fn poll_timeout_floor_is_a_minimum() {
    let env = EnvConfig {
        timeout_floor: Some(Duration::from_secs(30)),
        ..EnvConfig::default()
    };
    let short = PollArgs {
        timeout_ms: Some(500),
        ..PollArgs::default()
    };
    let long = PollArgs {
        timeout_ms: Some(120_000),
        ..PollArgs::default()
    };

    let short = resolve_poll_config(&short, &env, "c".to_string()).expect("short");
    let long = resolve_poll_config(&long, &env, "c".to_string()).expect("long");

    assert_eq!(short.timeout(), Duration::from_secs(30));
    assert_eq!(long.timeout(), Duration::from_secs(120));
}

#[test]
fn poll_rejects_zero_interval_and_unknown_profile() {
    let zero = PollArgs {
        interval_ms: Some(0),
        ..PollArgs::default()
    };
    assert!(resolve_poll_config(&zero, &EnvConfig::default(), "c".to_string()).is_err());

    let dir = tempfile::tempdir().expect("tempdir");
    let missing = PollArgs {
        profile: Some("nope".to_string()),
        config: Some(write_config(&dir)),
        ..PollArgs::default()
    };
    let err = resolve_poll_config(&missing, &EnvConfig::default(), "c".to_string())
        .expect_err("unknown profile");
    assert!(err.to_string().contains("unknown profile: nope"));
}
