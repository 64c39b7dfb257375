// crates/labwait-core/src/outcome.rs
// ============================================================================
// Module: Poll Outcomes
// Description: Success reports, timeout records, and failure descriptors.
// Purpose: Let callers classify timeouts with their own error types.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! A poll ends in one of two ways: [`PollOutcome::Satisfied`] or
//! [`PollOutcome::TimedOut`]. Callers convert a timeout into their own error
//! through an [`OnTimeout`] descriptor: a pre-built error ([`FailWith`]), a
//! closure invoked lazily with the [`PollTimeout`], or [`Describe`] for error
//! types that implement `From<PollTimeout>`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use thiserror::Error;

// ============================================================================
// SECTION: Reports
// ============================================================================

/// Summary of a satisfied poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollReport {
    /// Number of condition evaluations, including the successful one.
    pub attempts: u32,
    /// Time from loop start to the successful evaluation.
    pub elapsed: Duration,
}

/// Record of a poll that ran out of time.
///
/// # Invariants
/// - `elapsed >= timeout`.
/// - `attempts >= 1`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "timed out waiting for {description} after {elapsed_ms} ms ({attempts} attempts)",
    elapsed_ms = .elapsed.as_millis()
)]
pub struct PollTimeout {
    /// Description of the awaited condition.
    pub description: String,
    /// Configured deadline.
    pub timeout: Duration,
    /// Configured interval.
    pub interval: Duration,
    /// Number of condition evaluations performed.
    pub attempts: u32,
    /// Time from loop start to the final evaluation.
    pub elapsed: Duration,
}

/// Terminal state of a poll loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The condition was observed true.
    Satisfied(PollReport),
    /// The deadline passed without the condition holding.
    TimedOut(PollTimeout),
}

impl PollOutcome {
    /// Returns true when the condition was observed true.
    #[must_use]
    pub const fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied(_))
    }

    /// Returns the number of evaluations performed.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        match self {
            Self::Satisfied(report) => report.attempts,
            Self::TimedOut(timeout) => timeout.attempts,
        }
    }

    /// Returns the elapsed time at the final evaluation.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        match self {
            Self::Satisfied(report) => report.elapsed,
            Self::TimedOut(timeout) => timeout.elapsed,
        }
    }
}

// ============================================================================
// SECTION: Default Error
// ============================================================================

/// Default classification for callers without their own error type.
///
/// # Invariants
/// - `Condition` carries the condition's error unchanged.
#[derive(Debug, Error)]
pub enum PollError<E> {
    /// The deadline passed without the condition holding.
    #[error(transparent)]
    Timeout(PollTimeout),
    /// The condition itself failed; the poll was aborted.
    #[error("condition evaluation failed: {0}")]
    Condition(E),
}

impl<E> PollError<E> {
    /// Returns the timeout record when this is a timeout.
    #[must_use]
    pub const fn as_timeout(&self) -> Option<&PollTimeout> {
        match self {
            Self::Timeout(timeout) => Some(timeout),
            Self::Condition(_) => None,
        }
    }
}

// ============================================================================
// SECTION: Failure Descriptors
// ============================================================================

/// Converts a timeout into the caller's error type.
pub trait OnTimeout<E> {
    /// Builds the error for `timeout`. Only called when the poll times out.
    fn signal(self, timeout: PollTimeout) -> E;
}

impl<E, F> OnTimeout<E> for F
where
    F: FnOnce(PollTimeout) -> E,
{
    fn signal(self, timeout: PollTimeout) -> E {
        self(timeout)
    }
}

/// Pre-built timeout error, returned as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailWith<E>(pub E);

impl<E> OnTimeout<E> for FailWith<E> {
    fn signal(self, _timeout: PollTimeout) -> E {
        self.0
    }
}

/// Converts the timeout through `E: From<PollTimeout>`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Describe;

impl<E: From<PollTimeout>> OnTimeout<E> for Describe {
    fn signal(self, timeout: PollTimeout) -> E {
        E::from(timeout)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns whole milliseconds in `duration`, saturating at [`u64::MAX`].
#[must_use]
pub fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
