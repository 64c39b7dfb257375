// crates/labwait-core/src/config.rs
// ============================================================================
// Module: Poll Configuration
// Description: Validated timeout, interval, and description for one poll loop.
// Purpose: Reject impossible poll settings before any condition runs.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! A [`PollConfig`] is built per call site and discarded after the loop. The
//! only invariant that can be violated is a zero interval; timeouts are
//! non-negative by construction.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use thiserror::Error;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default deadline for a poll loop.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(10);
/// Default delay between condition evaluations.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Description used when the caller does not supply one.
const DEFAULT_DESCRIPTION: &str = "condition";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Poll configuration errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PollConfigError {
    /// The interval between evaluations was zero.
    #[error("poll interval must be greater than zero")]
    ZeroInterval,
}

// ============================================================================
// SECTION: Config
// ============================================================================

/// Settings for a single poll loop.
///
/// # Invariants
/// - `interval` is strictly positive.
/// - `timeout` may be zero; the condition is still evaluated once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Maximum wall-clock budget for the loop.
    timeout: Duration,
    /// Delay between evaluations.
    interval: Duration,
    /// Human-readable label used in logs and timeout messages.
    description: String,
}

impl PollConfig {
    /// Creates a validated poll configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PollConfigError::ZeroInterval`] when `interval` is zero.
    pub fn new(
        timeout: Duration,
        interval: Duration,
        description: impl Into<String>,
    ) -> Result<Self, PollConfigError> {
        if interval.is_zero() {
            return Err(PollConfigError::ZeroInterval);
        }
        Ok(Self {
            timeout,
            interval,
            description: description.into(),
        })
    }

    /// Returns the deadline.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the interval between evaluations.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Replaces the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Replaces the timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_POLL_TIMEOUT,
            interval: DEFAULT_POLL_INTERVAL,
            description: DEFAULT_DESCRIPTION.to_string(),
        }
    }
}
