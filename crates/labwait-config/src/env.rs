// crates/labwait-config/src/env.rs
// ============================================================================
// Module: Lab Wait Environment
// Description: Environment-backed overrides for the wait tooling.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 or empty values fail closed. Parsing goes
//! through a lookup function so callers and tests never mutate the process
//! environment.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys recognized by the wait tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabWaitEnv {
    /// Config file path override.
    Config,
    /// Timeout floor in seconds (positive integer).
    TimeoutSeconds,
    /// Output language (`en` or `ca`).
    Lang,
    /// Log filter directive for the CLI subscriber.
    Log,
}

impl LabWaitEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Config => "LABWAIT_CONFIG",
            Self::TimeoutSeconds => "LABWAIT_TIMEOUT_SEC",
            Self::Lang => "LABWAIT_LANG",
            Self::Log => "LABWAIT_LOG",
        }
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnvConfig {
    /// Config file path override.
    pub config_path: Option<PathBuf>,
    /// Timeout floor applied to every wait.
    pub timeout_floor: Option<Duration>,
    /// Requested output language.
    pub lang: Option<String>,
    /// Log filter directive.
    pub log_filter: Option<String>,
}

impl EnvConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error when an environment value is not valid UTF-8, is empty,
    /// or fails validation (for example, a zero timeout).
    pub fn load() -> Result<Self, String> {
        Self::from_lookup(|name| std::env::var_os(name))
    }

    /// Loads configuration through `lookup` instead of the process environment.
    ///
    /// # Errors
    ///
    /// Same as [`EnvConfig::load`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let read = |key: LabWaitEnv| read_nonempty(key.as_str(), lookup(key.as_str()));
        let config_path = read(LabWaitEnv::Config)?.map(PathBuf::from);
        let timeout_floor = read(LabWaitEnv::TimeoutSeconds)?
            .map(|value| parse_timeout_seconds(LabWaitEnv::TimeoutSeconds.as_str(), &value))
            .transpose()?;
        let lang = read(LabWaitEnv::Lang)?;
        let log_filter = read(LabWaitEnv::Log)?;
        Ok(Self {
            config_path,
            timeout_floor,
            lang,
            log_filter,
        })
    }
}

// ============================================================================
// SECTION: Timeout Resolution
// ============================================================================

/// Returns the effective timeout for a wait.
///
/// The override acts as a minimum so it never shortens an explicitly longer
/// timeout; slow lab hosts raise it to stretch every wait at once.
#[must_use]
pub fn resolve_timeout(requested: Duration, floor: Option<Duration>) -> Duration {
    floor.map_or(requested, |floor| requested.max(floor))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Decodes a raw value, rejecting invalid UTF-8.
fn decode_strict(name: &str, raw: Option<OsString>) -> Result<Option<String>, String> {
    raw.map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| format!("{name} must be valid UTF-8"))
    })
}

/// Decodes a raw value and rejects empty values.
///
/// # Errors
///
/// Returns an error when the variable is set but empty or whitespace.
fn read_nonempty(name: &str, raw: Option<OsString>) -> Result<Option<String>, String> {
    match decode_strict(name, raw)? {
        Some(value) if value.trim().is_empty() => Err(format!("{name} must not be empty")),
        Some(value) => Ok(Some(value.trim().to_string())),
        None => Ok(None),
    }
}

/// Parses a positive timeout value from an environment variable string.
///
/// # Errors
///
/// Returns an error when the value is non-numeric or zero.
fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration, String> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("{name} must be a positive integer number of seconds"))?;
    if secs == 0 {
        return Err(format!("{name} must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}
