// crates/labwait-config/src/env_tests.rs
// ============================================================================
// Module: Lab Wait Env Unit Tests
// Description: Unit coverage for strict environment parsing.
// Purpose: Ensure configuration parsing fails closed on invalid inputs.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment parsing is driven through lookup maps, so no test touches the
//! process environment.
//! Invariants:
//! - Environment parsing rejects invalid or empty values.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use super::EnvConfig;
use super::LabWaitEnv;
use super::resolve_timeout;

fn load_with(entries: &[(LabWaitEnv, &str)]) -> Result<EnvConfig, String> {
    let map: HashMap<&'static str, OsString> =
        entries.iter().map(|(key, value)| (key.as_str(), OsString::from(*value))).collect();
    EnvConfig::from_lookup(|name| map.get(name).cloned())
}

#[test]
fn env_defaults_when_unset() {
    let config = load_with(&[]).expect("load env config");
    assert_eq!(config, EnvConfig::default());
}

#[test]
fn env_parses_all_keys() {
    let config = load_with(&[
        (LabWaitEnv::Config, "/etc/labwait.toml"),
        (LabWaitEnv::TimeoutSeconds, " 90 "),
        (LabWaitEnv::Lang, "ca"),
        (LabWaitEnv::Log, "labwait_core=debug"),
    ])
    .expect("load env config");

    assert_eq!(config.config_path, Some(PathBuf::from("/etc/labwait.toml")));
    assert_eq!(config.timeout_floor, Some(Duration::from_secs(90)));
    assert_eq!(config.lang.as_deref(), Some("ca"));
    assert_eq!(config.log_filter.as_deref(), Some("labwait_core=debug"));
}

#[test]
fn env_rejects_empty_values() {
    let err = load_with(&[(LabWaitEnv::Config, "   ")]).expect_err("empty rejected");
    assert_eq!(err, "LABWAIT_CONFIG must not be empty");
}

#[test]
fn env_rejects_zero_and_non_numeric_timeouts() {
    let zero = load_with(&[(LabWaitEnv::TimeoutSeconds, "0")]).expect_err("zero rejected");
    assert_eq!(zero, "LABWAIT_TIMEOUT_SEC must be greater than zero");

    let word = load_with(&[(LabWaitEnv::TimeoutSeconds, "soon")]).expect_err("word rejected");
    assert_eq!(word, "LABWAIT_TIMEOUT_SEC must be a positive integer number of seconds");
}

#[cfg(unix)]
#[test]
fn env_rejects_invalid_utf8() {
    use std::os::unix::ffi::OsStringExt;

    let raw = OsString::from_vec(vec![0xFF, 0xFE]);
    let err = EnvConfig::from_lookup(|name| (name == LabWaitEnv::Lang.as_str()).then(|| raw.clone()))
        .expect_err("invalid utf-8 rejected");
    assert_eq!(err, "LABWAIT_LANG must be valid UTF-8");
}

#[test]
fn resolve_timeout_treats_override_as_minimum() {
    let requested = Duration::from_secs(30);

    assert_eq!(resolve_timeout(requested, None), requested);
    assert_eq!(resolve_timeout(requested, Some(Duration::from_secs(10))), requested);
    assert_eq!(resolve_timeout(requested, Some(Duration::from_secs(120))), Duration::from_secs(120));
}
