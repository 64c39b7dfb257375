// crates/labwait-core/src/observer.rs
// ============================================================================
// Module: Poll Observers
// Description: Hooks for attempt and outcome events emitted by the poller.
// Purpose: Provide progress and metrics hooks without hard deps.
// Dependencies: crate::outcome
// ============================================================================

//! ## Overview
//! Every poll emits `tracing` events regardless of the observer. Observers
//! exist for callers that need the events programmatically: progress output,
//! counters, or assertions in tests.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use crate::outcome::PollOutcome;

// ============================================================================
// SECTION: Events
// ============================================================================

/// One condition evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollAttempt<'a> {
    /// Description of the awaited condition.
    pub description: &'a str,
    /// 1-based attempt number.
    pub attempt: u32,
    /// Time from loop start to the end of this evaluation.
    pub elapsed: Duration,
    /// Whether the condition held.
    pub satisfied: bool,
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Sink for poll events.
pub trait PollObserver {
    /// Records a completed condition evaluation.
    fn on_attempt(&self, attempt: &PollAttempt<'_>);

    /// Records the terminal outcome. Not called when the condition errors.
    fn on_outcome(&self, _outcome: &PollOutcome) {}
}

impl<O: PollObserver + ?Sized> PollObserver for &O {
    fn on_attempt(&self, attempt: &PollAttempt<'_>) {
        (**self).on_attempt(attempt);
    }

    fn on_outcome(&self, outcome: &PollOutcome) {
        (**self).on_outcome(outcome);
    }
}

/// No-op observer.
///
/// # Invariants
/// - Events are intentionally discarded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoopObserver;

impl PollObserver for NoopObserver {
    fn on_attempt(&self, _attempt: &PollAttempt<'_>) {}
}
