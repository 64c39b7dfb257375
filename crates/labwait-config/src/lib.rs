// crates/labwait-config/src/lib.rs
// ============================================================================
// Module: Lab Wait Configuration
// Description: Configuration model, validation, and environment overrides.
// Purpose: Turn a TOML file and environment variables into poll settings and probes.
// Dependencies: labwait-core, labwait-probes, serde, toml
// ============================================================================

//! ## Overview
//! `labwait.toml` declares default timings, named wait profiles, and named
//! probes. Loading is strict: unknown keys, dangling profile references, and
//! out-of-range timings fail closed. Environment variables are read through
//! [`EnvConfig`] and never mutated.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod env;

#[cfg(test)]
mod env_tests;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use config::CommandProbeDefinition;
pub use config::ConfigError;
pub use config::ConfiguredProbe;
pub use config::DEFAULT_CONFIG_NAME;
pub use config::ExpectDefinition;
pub use config::LabWaitConfig;
pub use config::MAX_CONFIG_FILE_SIZE;
pub use config::PathCheckDefinition;
pub use config::PathProbeDefinition;
pub use config::ProbeCondition;
pub use config::ProbeDefinition;
pub use config::WaitDefaults;
pub use config::WaitProfile;
pub use config::resolve_config_path;
pub use env::EnvConfig;
pub use env::LabWaitEnv;
pub use env::resolve_timeout;
