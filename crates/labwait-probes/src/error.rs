// crates/labwait-probes/src/error.rs
// ============================================================================
// Module: Probe Errors
// Description: Failures raised while observing external state.
// Purpose: Give every probe one error type the poller can propagate.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! A [`ProbeError`] aborts a wait on the attempt that raised it unless the
//! condition is wrapped in [`crate::Tolerant`]. "Not there yet" is never an
//! error; probes report it as `Ok(false)`.

use thiserror::Error;

/// Probe errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - String payloads may include untrusted tool output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// The external program could not be started.
    #[error("failed to spawn {program}: {message}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying OS error text.
        message: String,
    },
    /// A filesystem operation failed for a reason other than absence.
    #[error("i/o error on {path}: {message}")]
    Io {
        /// Path being probed.
        path: String,
        /// Underlying OS error text.
        message: String,
    },
    /// Waiting on a child process failed.
    #[error("child process wait failed: {0}")]
    Wait(String),
    /// A state reader failed to produce a value.
    #[error("state read failed: {0}")]
    Read(String),
    /// A transition trigger action failed.
    #[error("trigger failed: {0}")]
    Trigger(String),
}
