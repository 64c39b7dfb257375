// crates/labwait-config/src/config.rs
// ============================================================================
// Module: Lab Wait Config Model
// Description: Configuration loading and validation for wait profiles and probes.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: labwait-core, labwait-probes, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Every table rejects unknown keys. Profiles inherit unset timings from
//! `[defaults]`; probes reference profiles by name and the reference must
//! resolve.
//!
//! ```toml
//! [defaults]
//! timeout_ms = 10000
//! interval_ms = 1000
//!
//! [profiles.modem]
//! timeout_ms = 60000
//! description = "modem registration"
//!
//! [probes.adb-device]
//! kind = "command"
//! profile = "modem"
//! program = "adb"
//! args = ["get-state"]
//! expect = { stdout_equals = "device" }
//! ```

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use labwait_core::PollConfig;
use labwait_probes::CommandProbe;
use labwait_probes::CommandSpec;
use labwait_probes::OutputExpectation;
use labwait_probes::PathCheck;
use labwait_probes::PathProbe;
use labwait_probes::ProbeError;
use serde::Deserialize;
use thiserror::Error;

use crate::env::EnvConfig;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "labwait.toml";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of profiles.
const MAX_PROFILES: usize = 256;
/// Maximum number of probes.
const MAX_PROBES: usize = 256;
/// Maximum length of a profile or probe name.
const MAX_NAME_LENGTH: usize = 64;
/// Maximum length of a description.
const MAX_DESCRIPTION_LENGTH: usize = 256;
/// Maximum timeout or interval in milliseconds (one day).
const MAX_TIMEOUT_MS: u64 = 86_400_000;
/// Maximum number of command arguments.
const MAX_ARGS: usize = 128;
/// Maximum length of a single command argument or env value.
const MAX_ARG_LENGTH: usize = 4096;
/// Maximum number of command environment entries.
const MAX_ENV_VARS: usize = 64;
/// Description used when neither profile nor probe names one.
const DEFAULT_DESCRIPTION: &str = "condition";
/// Default timeout in milliseconds.
const DEFAULT_TIMEOUT_MS: u64 = 10_000;
/// Default poll interval in milliseconds.
const DEFAULT_INTERVAL_MS: u64 = 1_000;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Lab wait configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LabWaitConfig {
    /// Timings used when a profile leaves them unset.
    #[serde(default)]
    pub defaults: WaitDefaults,
    /// Named wait profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, WaitProfile>,
    /// Named probes.
    #[serde(default)]
    pub probes: BTreeMap<String, ProbeDefinition>,
}

/// Default timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaitDefaults {
    /// Timeout in milliseconds.
    pub timeout_ms: u64,
    /// Poll interval in milliseconds.
    pub interval_ms: u64,
}

impl Default for WaitDefaults {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            interval_ms: DEFAULT_INTERVAL_MS,
        }
    }
}

/// Named timeout, interval, and description triple.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaitProfile {
    /// Timeout in milliseconds; inherits `[defaults]` when unset.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Poll interval in milliseconds; inherits `[defaults]` when unset.
    #[serde(default)]
    pub interval_ms: Option<u64>,
    /// Condition description used in timeout messages.
    #[serde(default)]
    pub description: Option<String>,
}

/// Named probe definition, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbeDefinition {
    /// Runs an external command.
    Command(CommandProbeDefinition),
    /// Checks a filesystem path.
    Path(PathProbeDefinition),
}

/// Command probe keys.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandProbeDefinition {
    /// Wait profile name.
    #[serde(default)]
    pub profile: Option<String>,
    /// Description override.
    #[serde(default)]
    pub description: Option<String>,
    /// Treat evaluation errors as "not yet".
    #[serde(default)]
    pub tolerant: bool,
    /// Program to execute.
    pub program: String,
    /// Program arguments.
    #[serde(default)]
    pub args: Vec<String>,
    /// Extra environment for the child.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Working directory for the child.
    #[serde(default)]
    pub working_dir: Option<String>,
    /// Expected result.
    #[serde(default)]
    pub expect: ExpectDefinition,
}

/// Command expectation as written in config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectDefinition {
    /// `expect = "exit_success"`.
    #[default]
    ExitSuccess,
    /// `expect = { stdout_equals = "..." }`.
    StdoutEquals(String),
    /// `expect = { stdout_contains = "..." }`.
    StdoutContains(String),
    /// `expect = "stdout_non_empty"`.
    StdoutNonEmpty,
}

impl From<&ExpectDefinition> for OutputExpectation {
    fn from(value: &ExpectDefinition) -> Self {
        match value {
            ExpectDefinition::ExitSuccess => Self::ExitSuccess,
            ExpectDefinition::StdoutEquals(text) => Self::StdoutEquals(text.clone()),
            ExpectDefinition::StdoutContains(text) => Self::StdoutContains(text.clone()),
            ExpectDefinition::StdoutNonEmpty => Self::StdoutNonEmpty,
        }
    }
}

/// Path probe keys.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathProbeDefinition {
    /// Wait profile name.
    #[serde(default)]
    pub profile: Option<String>,
    /// Description override.
    #[serde(default)]
    pub description: Option<String>,
    /// Treat evaluation errors as "not yet".
    #[serde(default)]
    pub tolerant: bool,
    /// Probed path.
    pub path: String,
    /// Check applied to the path.
    #[serde(default)]
    pub check: PathCheckDefinition,
}

/// Path check as written in config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathCheckDefinition {
    /// `check = "exists"`.
    #[default]
    Exists,
    /// `check = "absent"`.
    Absent,
    /// `check = { first_line_equals = "..." }`.
    FirstLineEquals(String),
}

impl From<&PathCheckDefinition> for PathCheck {
    fn from(value: &PathCheckDefinition) -> Self {
        match value {
            PathCheckDefinition::Exists => Self::Exists,
            PathCheckDefinition::Absent => Self::Absent,
            PathCheckDefinition::FirstLineEquals(text) => Self::FirstLineEquals(text.clone()),
        }
    }
}

impl ProbeDefinition {
    /// Returns the referenced profile name.
    #[must_use]
    pub fn profile(&self) -> Option<&str> {
        match self {
            Self::Command(def) => def.profile.as_deref(),
            Self::Path(def) => def.profile.as_deref(),
        }
    }

    /// Returns the description override.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Command(def) => def.description.as_deref(),
            Self::Path(def) => def.description.as_deref(),
        }
    }

    /// Returns whether evaluation errors are tolerated.
    #[must_use]
    pub const fn tolerant(&self) -> bool {
        match self {
            Self::Command(def) => def.tolerant,
            Self::Path(def) => def.tolerant,
        }
    }

    /// Builds the runnable condition.
    #[must_use]
    pub fn build(&self) -> ProbeCondition {
        match self {
            Self::Command(def) => {
                let mut spec = CommandSpec::new(def.program.clone()).args(def.args.iter().cloned());
                spec.env.clone_from(&def.env);
                spec.working_dir = def.working_dir.as_deref().map(|dir| PathBuf::from(dir.trim()));
                ProbeCondition::Command(CommandProbe::new(spec, (&def.expect).into()))
            }
            Self::Path(def) => {
                ProbeCondition::Path(PathProbe::new(def.path.trim(), (&def.check).into()))
            }
        }
    }
}

// ============================================================================
// SECTION: Runnable Probes
// ============================================================================

/// Condition built from a [`ProbeDefinition`].
#[derive(Debug, Clone)]
pub enum ProbeCondition {
    /// Command probe.
    Command(CommandProbe),
    /// Path probe.
    Path(PathProbe),
}

impl ProbeCondition {
    /// Evaluates the condition once.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError`] when the probe cannot observe its target.
    pub fn check(&mut self) -> Result<bool, ProbeError> {
        match self {
            Self::Command(probe) => probe.check(),
            Self::Path(probe) => probe.check(),
        }
    }
}

/// A named probe resolved against its profile.
#[derive(Debug, Clone)]
pub struct ConfiguredProbe {
    /// Probe name.
    pub name: String,
    /// Effective poll settings.
    pub poll: PollConfig,
    /// Runnable condition.
    pub condition: ProbeCondition,
    /// Whether evaluation errors are tolerated.
    pub tolerant: bool,
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl LabWaitConfig {
    /// Loads and validates configuration from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        validate_path(path)?;
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::parse(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_timings("defaults", Some(self.defaults.timeout_ms), Some(self.defaults.interval_ms))?;
        if self.profiles.len() > MAX_PROFILES {
            return Err(ConfigError::Invalid(format!("too many profiles (max {MAX_PROFILES})")));
        }
        if self.probes.len() > MAX_PROBES {
            return Err(ConfigError::Invalid(format!("too many probes (max {MAX_PROBES})")));
        }
        for (name, profile) in &self.profiles {
            let field = format!("profiles.{name}");
            validate_name(&field, name)?;
            validate_timings(&field, profile.timeout_ms, profile.interval_ms)?;
            validate_description(&field, profile.description.as_deref())?;
        }
        for (name, probe) in &self.probes {
            let field = format!("probes.{name}");
            validate_name(&field, name)?;
            validate_description(&field, probe.description())?;
            if let Some(profile) = probe.profile()
                && !self.profiles.contains_key(profile)
            {
                return Err(ConfigError::Invalid(format!(
                    "{field}.profile references unknown profile {profile}"
                )));
            }
            match probe {
                ProbeDefinition::Command(def) => validate_command(&field, def)?,
                ProbeDefinition::Path(def) => validate_path_string(&format!("{field}.path"), &def.path)?,
            }
        }
        Ok(())
    }

    // ============================================================================
    // SECTION: Resolution
    // ============================================================================

    /// Returns poll settings for `profile`, or for `[defaults]` when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownProfile`] when the profile is not defined.
    pub fn poll_config(&self, profile: Option<&str>) -> Result<PollConfig, ConfigError> {
        self.resolve_poll(profile, None, None)
    }

    /// Resolves the named probe against its profile.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownProbe`] when the probe is not defined.
    pub fn probe(&self, name: &str) -> Result<ConfiguredProbe, ConfigError> {
        let definition =
            self.probes.get(name).ok_or_else(|| ConfigError::UnknownProbe(name.to_string()))?;
        let fallback = format!("probe {name}");
        let poll =
            self.resolve_poll(definition.profile(), definition.description(), Some(&fallback))?;
        Ok(ConfiguredProbe {
            name: name.to_string(),
            poll,
            condition: definition.build(),
            tolerant: definition.tolerant(),
        })
    }

    /// Merges profile timings over defaults.
    ///
    /// Description order: `description`, the profile's description,
    /// `fallback`, the profile name, then [`DEFAULT_DESCRIPTION`].
    fn resolve_poll(
        &self,
        profile: Option<&str>,
        description: Option<&str>,
        fallback: Option<&str>,
    ) -> Result<PollConfig, ConfigError> {
        let profile = profile
            .map(|name| {
                self.profiles
                    .get(name)
                    .map(|profile| (name, profile))
                    .ok_or_else(|| ConfigError::UnknownProfile(name.to_string()))
            })
            .transpose()?;
        let timeout_ms = profile
            .and_then(|(_, profile)| profile.timeout_ms)
            .unwrap_or(self.defaults.timeout_ms);
        let interval_ms = profile
            .and_then(|(_, profile)| profile.interval_ms)
            .unwrap_or(self.defaults.interval_ms);
        let description = description
            .or_else(|| profile.and_then(|(_, profile)| profile.description.as_deref()))
            .or(fallback)
            .or_else(|| profile.map(|(name, _)| name))
            .unwrap_or(DEFAULT_DESCRIPTION);
        PollConfig::new(
            Duration::from_millis(timeout_ms),
            Duration::from_millis(interval_ms),
            description,
        )
        .map_err(|err| ConfigError::Invalid(err.to_string()))
    }
}

/// Resolves the config path from an explicit path, the environment, or the
/// default filename.
#[must_use]
pub fn resolve_config_path(explicit: Option<&Path>, env: &EnvConfig) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| env.config_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_NAME))
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
    /// A requested profile is not defined.
    #[error("unknown profile: {0}")]
    UnknownProfile(String),
    /// A requested probe is not defined.
    #[error("unknown probe: {0}")]
    UnknownProbe(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a profile or probe name: `[a-z0-9_-]`, 1 to 64 characters.
fn validate_name(field: &str, name: &str) -> Result<(), ConfigError> {
    if name.is_empty() || name.len() > MAX_NAME_LENGTH {
        return Err(ConfigError::Invalid(format!(
            "{field} name must be 1 to {MAX_NAME_LENGTH} characters"
        )));
    }
    let valid = name
        .bytes()
        .all(|byte| byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'_' || byte == b'-');
    if !valid {
        return Err(ConfigError::Invalid(format!(
            "{field} name must contain only lowercase letters, digits, '_' or '-'"
        )));
    }
    Ok(())
}

/// Validates timeout and interval bounds.
fn validate_timings(
    field: &str,
    timeout_ms: Option<u64>,
    interval_ms: Option<u64>,
) -> Result<(), ConfigError> {
    if let Some(timeout_ms) = timeout_ms
        && timeout_ms > MAX_TIMEOUT_MS
    {
        return Err(ConfigError::Invalid(format!(
            "{field}.timeout_ms must be at most {MAX_TIMEOUT_MS}"
        )));
    }
    match interval_ms {
        Some(0) => {
            Err(ConfigError::Invalid(format!("{field}.interval_ms must be greater than zero")))
        }
        Some(interval_ms) if interval_ms > MAX_TIMEOUT_MS => Err(ConfigError::Invalid(format!(
            "{field}.interval_ms must be at most {MAX_TIMEOUT_MS}"
        ))),
        _ => Ok(()),
    }
}

/// Validates an optional description.
fn validate_description(field: &str, description: Option<&str>) -> Result<(), ConfigError> {
    match description {
        Some(text) if text.trim().is_empty() => {
            Err(ConfigError::Invalid(format!("{field}.description must be non-empty")))
        }
        Some(text) if text.len() > MAX_DESCRIPTION_LENGTH => Err(ConfigError::Invalid(format!(
            "{field}.description exceeds {MAX_DESCRIPTION_LENGTH} bytes"
        ))),
        _ => Ok(()),
    }
}

/// Validates command probe keys.
fn validate_command(field: &str, def: &CommandProbeDefinition) -> Result<(), ConfigError> {
    if def.program.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field}.program must be non-empty")));
    }
    if def.args.len() > MAX_ARGS {
        return Err(ConfigError::Invalid(format!("{field}.args exceeds {MAX_ARGS} entries")));
    }
    if def.args.iter().any(|arg| arg.len() > MAX_ARG_LENGTH) {
        return Err(ConfigError::Invalid(format!("{field}.args entry exceeds max length")));
    }
    if def.env.len() > MAX_ENV_VARS {
        return Err(ConfigError::Invalid(format!("{field}.env exceeds {MAX_ENV_VARS} entries")));
    }
    for (key, value) in &def.env {
        if key.is_empty() || key.contains('=') || key.contains('\0') {
            return Err(ConfigError::Invalid(format!("{field}.env has invalid key '{key}'")));
        }
        if value.len() > MAX_ARG_LENGTH || value.contains('\0') {
            return Err(ConfigError::Invalid(format!("{field}.env.{key} is invalid")));
        }
    }
    if let Some(dir) = &def.working_dir {
        validate_path_string(&format!("{field}.working_dir"), dir)?;
    }
    Ok(())
}
