// crates/labwait-cli/src/logging.rs
// ============================================================================
// Module: CLI Logging
// Description: Installs the tracing subscriber for diagnostic output.
// Dependencies: tracing-subscriber
// ============================================================================

//! ## Overview
//! Diagnostics go to stderr so stdout carries only the JSON summary. The
//! filter comes from `LABWAIT_LOG` and defaults to [`DEFAULT_LOG_FILTER`].

use tracing_subscriber::EnvFilter;

/// Filter applied when no directive is configured.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Parses a filter directive, falling back to [`DEFAULT_LOG_FILTER`].
///
/// # Errors
///
/// Returns the parser's message when the directive is malformed.
pub fn build_filter(directive: Option<&str>) -> Result<EnvFilter, String> {
    EnvFilter::try_new(directive.unwrap_or(DEFAULT_LOG_FILTER)).map_err(|err| err.to_string())
}

/// Installs the global stderr subscriber.
///
/// # Errors
///
/// Returns an error when the directive is malformed or a subscriber is
/// already installed.
pub fn init_logging(directive: Option<&str>) -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(directive)?)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| err.to_string())
}
