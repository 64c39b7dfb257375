// crates/labwait-core/src/poller.rs
// ============================================================================
// Module: Condition Poller
// Description: Fixed-interval polling of a caller-supplied predicate.
// Purpose: Replace arbitrary sleeps with bounded, observable waits.
// Dependencies: crate::clock, crate::config, crate::observer, crate::outcome, tracing
// ============================================================================

//! ## Overview
//! [`ConditionPoller::run`] is the loop; everything else classifies its
//! result. The loop evaluates the condition, stops on success, stops when the
//! deadline is spent, and otherwise sleeps one interval (clamped to the
//! remaining budget) before trying again.
//!
//! The poller does not bound a single evaluation. A condition that blocks
//! for a minute on a remote service makes the loop overshoot by a minute.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::convert::Infallible;

use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::clock::Clock;
use crate::clock::SystemClock;
use crate::config::PollConfig;
use crate::observer::NoopObserver;
use crate::observer::PollAttempt;
use crate::observer::PollObserver;
use crate::outcome::OnTimeout;
use crate::outcome::PollError;
use crate::outcome::PollOutcome;
use crate::outcome::PollReport;
use crate::outcome::PollTimeout;
use crate::outcome::duration_millis;

// ============================================================================
// SECTION: Poller
// ============================================================================

/// Polls a condition until it holds or the deadline elapses.
///
/// # Invariants
/// - The first evaluation happens before any sleep.
/// - Condition errors end the loop immediately and are returned unchanged.
/// - No backoff: every sleep is `interval`, except the last one, which is
///   clamped to the remaining budget.
#[derive(Debug, Clone)]
pub struct ConditionPoller<C = SystemClock, O = NoopObserver> {
    /// Loop settings.
    config: PollConfig,
    /// Time source and sleep primitive.
    clock: C,
    /// Event sink.
    observer: O,
}

impl ConditionPoller {
    /// Creates a poller on the system clock with no observer.
    #[must_use]
    pub const fn new(config: PollConfig) -> Self {
        Self {
            config,
            clock: SystemClock,
            observer: NoopObserver,
        }
    }
}

impl<C: Clock, O: PollObserver> ConditionPoller<C, O> {
    /// Replaces the clock.
    #[must_use]
    pub fn with_clock<C2: Clock>(self, clock: C2) -> ConditionPoller<C2, O> {
        ConditionPoller {
            config: self.config,
            clock,
            observer: self.observer,
        }
    }

    /// Replaces the observer.
    #[must_use]
    pub fn with_observer<O2: PollObserver>(self, observer: O2) -> ConditionPoller<C, O2> {
        ConditionPoller {
            config: self.config,
            clock: self.clock,
            observer,
        }
    }

    /// Returns the loop settings.
    #[must_use]
    pub const fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Runs the loop and returns its terminal outcome.
    ///
    /// # Errors
    ///
    /// Returns the condition's error as soon as an evaluation fails.
    pub fn run<E, F>(&self, mut condition: F) -> Result<PollOutcome, E>
    where
        F: FnMut() -> Result<bool, E>,
    {
        let description = self.config.description();
        let timeout = self.config.timeout();
        let interval = self.config.interval();
        let start = self.clock.now();
        let mut attempts: u32 = 0;

        loop {
            attempts = attempts.saturating_add(1);
            let satisfied = match condition() {
                Ok(satisfied) => satisfied,
                Err(err) => {
                    warn!(description, attempt = attempts, "condition evaluation failed, aborting poll");
                    return Err(err);
                }
            };
            let elapsed = self.clock.now().saturating_duration_since(start);
            self.observer.on_attempt(&PollAttempt {
                description,
                attempt: attempts,
                elapsed,
                satisfied,
            });

            if satisfied {
                info!(
                    description,
                    attempts,
                    elapsed_ms = duration_millis(elapsed),
                    "condition satisfied"
                );
                let outcome = PollOutcome::Satisfied(PollReport {
                    attempts,
                    elapsed,
                });
                self.observer.on_outcome(&outcome);
                return Ok(outcome);
            }

            if elapsed >= timeout {
                warn!(
                    description,
                    attempts,
                    elapsed_ms = duration_millis(elapsed),
                    timeout_ms = duration_millis(timeout),
                    "timed out waiting for condition"
                );
                let outcome = PollOutcome::TimedOut(PollTimeout {
                    description: description.to_string(),
                    timeout,
                    interval,
                    attempts,
                    elapsed,
                });
                self.observer.on_outcome(&outcome);
                return Ok(outcome);
            }

            let pause = interval.min(timeout.saturating_sub(elapsed));
            debug!(
                description,
                attempt = attempts,
                elapsed_ms = duration_millis(elapsed),
                sleep_ms = duration_millis(pause),
                "condition not yet satisfied"
            );
            self.clock.sleep(pause);
        }
    }

    /// Polls `condition`, converting a timeout through `on_timeout`.
    ///
    /// `on_timeout` is consumed only when the deadline passes.
    ///
    /// # Errors
    ///
    /// Returns the condition's error unchanged, or the error built by
    /// `on_timeout` when the deadline passes.
    pub fn poll<E, F, T>(&self, condition: F, on_timeout: T) -> Result<PollReport, E>
    where
        F: FnMut() -> Result<bool, E>,
        T: OnTimeout<E>,
    {
        match self.run(condition)? {
            PollOutcome::Satisfied(report) => Ok(report),
            PollOutcome::TimedOut(timeout) => Err(on_timeout.signal(timeout)),
        }
    }

    /// Polls `condition` with the default [`PollError`] classification.
    ///
    /// # Errors
    ///
    /// Returns [`PollError::Condition`] when an evaluation fails and
    /// [`PollError::Timeout`] when the deadline passes.
    pub fn wait<E, F>(&self, mut condition: F) -> Result<PollReport, PollError<E>>
    where
        F: FnMut() -> Result<bool, E>,
    {
        self.poll(|| condition().map_err(PollError::Condition), PollError::Timeout)
    }

    /// Polls an infallible predicate, converting a timeout through `on_timeout`.
    ///
    /// # Errors
    ///
    /// Returns the error built by `on_timeout` when the deadline passes.
    pub fn poll_bool<E, F, T>(&self, mut condition: F, on_timeout: T) -> Result<PollReport, E>
    where
        F: FnMut() -> bool,
        T: OnTimeout<E>,
    {
        self.poll(|| Ok(condition()), on_timeout)
    }

    /// Polls an infallible predicate.
    ///
    /// # Errors
    ///
    /// Returns the [`PollTimeout`] record when the deadline passes.
    pub fn wait_bool<F>(&self, mut condition: F) -> Result<PollReport, PollTimeout>
    where
        F: FnMut() -> bool,
    {
        match self.run(|| Ok::<bool, Infallible>(condition())) {
            Ok(PollOutcome::Satisfied(report)) => Ok(report),
            Ok(PollOutcome::TimedOut(timeout)) => Err(timeout),
            Err(never) => match never {},
        }
    }
}

// ============================================================================
// SECTION: Free Function
// ============================================================================

/// Polls `condition` on the system clock.
///
/// # Errors
///
/// Returns the condition's error unchanged, or the error built by
/// `on_timeout` when the deadline passes.
pub fn poll_for_condition<E, F, T>(
    config: PollConfig,
    condition: F,
    on_timeout: T,
) -> Result<PollReport, E>
where
    F: FnMut() -> Result<bool, E>,
    T: OnTimeout<E>,
{
    ConditionPoller::new(config).poll(condition, on_timeout)
}
