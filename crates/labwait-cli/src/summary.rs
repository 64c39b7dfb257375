// crates/labwait-cli/src/summary.rs
// ============================================================================
// Module: Wait Summaries
// Description: JSON outcome line printed after every wait.
// Purpose: Give scripts a stable, machine-readable result alongside the exit code.
// Dependencies: labwait-core, serde, serde_json
// ============================================================================

//! ## Overview
//! Every wait command prints exactly one [`WaitSummary`] line on stdout. The
//! exit code mirrors the status: [`WaitStatus::exit_code`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use labwait_core::PollReport;
use labwait_core::PollTimeout;
use labwait_core::duration_millis;
use serde::Serialize;

// ============================================================================
// SECTION: Exit Codes
// ============================================================================

/// Exit code for a satisfied wait.
pub const EXIT_SATISFIED: u8 = 0;
/// Exit code for a failed condition check or any other error.
pub const EXIT_FAILED: u8 = 1;
/// Exit code for a timed-out wait.
pub const EXIT_TIMED_OUT: u8 = 2;

// ============================================================================
// SECTION: Summary
// ============================================================================

/// Terminal status of a wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitStatus {
    /// The condition held.
    Satisfied,
    /// The deadline passed.
    TimedOut,
    /// A condition check failed and aborted the wait.
    Failed,
}

impl WaitStatus {
    /// Returns the process exit code for this status.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Satisfied => EXIT_SATISFIED,
            Self::TimedOut => EXIT_TIMED_OUT,
            Self::Failed => EXIT_FAILED,
        }
    }
}

/// One-line JSON summary of a wait.
///
/// # Invariants
/// - `attempts` and `elapsed_ms` are present unless `status` is `failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WaitSummary {
    /// Terminal status.
    pub status: WaitStatus,
    /// Condition description.
    pub description: String,
    /// Evaluations performed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,
    /// Elapsed wall time in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
    /// Error that aborted the wait, or the last tolerated error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WaitSummary {
    /// Summary for a satisfied wait.
    #[must_use]
    pub fn satisfied(description: impl Into<String>, report: PollReport) -> Self {
        Self {
            status: WaitStatus::Satisfied,
            description: description.into(),
            attempts: Some(report.attempts),
            elapsed_ms: Some(duration_millis(report.elapsed)),
            error: None,
        }
    }

    /// Summary for a timed-out wait.
    #[must_use]
    pub fn timed_out(timeout: &PollTimeout, last_error: Option<String>) -> Self {
        Self {
            status: WaitStatus::TimedOut,
            description: timeout.description.clone(),
            attempts: Some(timeout.attempts),
            elapsed_ms: Some(duration_millis(timeout.elapsed)),
            error: last_error,
        }
    }

    /// Summary for an aborted wait.
    #[must_use]
    pub fn failed(description: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status: WaitStatus::Failed,
            description: description.into(),
            attempts: None,
            elapsed_ms: None,
            error: Some(error.into()),
        }
    }

    /// Renders the summary as a single JSON line.
    ///
    /// # Errors
    ///
    /// Returns the serializer's error when encoding fails.
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
