// crates/labwait-probes/src/state.rs
// ============================================================================
// Module: State Waits
// Description: Wait for an external system to report an expected state.
// Purpose: Express state-transition assertions against modems, services, and daemons.
// Dependencies: labwait-core, thiserror
// ============================================================================

//! ## Overview
//! A [`StateReader`] fetches the current state of an external system (a
//! modem's registration state, a service's activation state). The waits in
//! this module poll the reader until it reports an expected value; on timeout
//! the error carries both the expected and the last observed state.
//!
//! A [`TransitionPlan`] chains waits: each step optionally fires a trigger
//! (for example, setting a property on the device) and then waits for the
//! resulting state. The first failing step ends the plan.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use labwait_core::Clock;
use labwait_core::ConditionPoller;
use labwait_core::PollObserver;
use labwait_core::PollOutcome;
use labwait_core::PollReport;
use labwait_core::PollTimeout;
use thiserror::Error;

use crate::error::ProbeError;

// ============================================================================
// SECTION: Reader
// ============================================================================

/// Source of the current state of an external system.
pub trait StateReader {
    /// State value compared against expectations.
    type State: Clone + PartialEq;

    /// Reads the current state.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError`] when the state cannot be read. The error aborts
    /// any wait driving this reader.
    fn read_state(&mut self) -> Result<Self::State, ProbeError>;
}

impl<S, F> StateReader for F
where
    F: FnMut() -> Result<S, ProbeError>,
    S: Clone + PartialEq,
{
    type State = S;

    fn read_state(&mut self) -> Result<S, ProbeError> {
        self()
    }
}

// ============================================================================
// SECTION: Results
// ============================================================================

/// A state wait that observed an expected value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateMatch<S> {
    /// The matching state.
    pub state: S,
    /// Poll summary.
    pub report: PollReport,
}

/// State wait errors.
///
/// # Invariants
/// - `Mismatch` labels are rendered from the typed states at construction.
#[derive(Debug, Error)]
pub enum StateWaitError<S> {
    /// The reader never reported an expected state before the deadline.
    #[error("{timeout}: state should be {expected_label}, but it is {observed_label}")]
    Mismatch {
        /// Acceptable states.
        expected: Vec<S>,
        /// Last state read, if any read completed.
        observed: Option<S>,
        /// Rendered `expected`.
        expected_label: String,
        /// Rendered `observed`.
        observed_label: String,
        /// Timeout record.
        timeout: PollTimeout,
    },
    /// The reader failed; the wait was aborted.
    #[error(transparent)]
    Read(#[from] ProbeError),
}

impl<S> StateWaitError<S> {
    /// Returns the last observed state for a mismatch.
    #[must_use]
    pub const fn observed(&self) -> Option<&S> {
        match self {
            Self::Mismatch {
                observed, ..
            } => observed.as_ref(),
            Self::Read(_) => None,
        }
    }

    /// Returns the timeout record for a mismatch.
    #[must_use]
    pub const fn timeout(&self) -> Option<&PollTimeout> {
        match self {
            Self::Mismatch {
                timeout, ..
            } => Some(timeout),
            Self::Read(_) => None,
        }
    }
}

// ============================================================================
// SECTION: Waits
// ============================================================================

/// Polls `reader` until it reports `expected`.
///
/// # Errors
///
/// Returns [`StateWaitError::Mismatch`] on timeout and
/// [`StateWaitError::Read`] as soon as the reader fails.
pub fn wait_for_state<C, O, R>(
    poller: &ConditionPoller<C, O>,
    reader: &mut R,
    expected: &R::State,
) -> Result<StateMatch<R::State>, StateWaitError<R::State>>
where
    C: Clock,
    O: PollObserver,
    R: StateReader + ?Sized,
    R::State: fmt::Display,
{
    wait_for_any_state(poller, reader, std::slice::from_ref(expected))
}

/// Polls `reader` until it reports any state in `expected`.
///
/// # Errors
///
/// Returns [`StateWaitError::Mismatch`] on timeout and
/// [`StateWaitError::Read`] as soon as the reader fails.
pub fn wait_for_any_state<C, O, R>(
    poller: &ConditionPoller<C, O>,
    reader: &mut R,
    expected: &[R::State],
) -> Result<StateMatch<R::State>, StateWaitError<R::State>>
where
    C: Clock,
    O: PollObserver,
    R: StateReader + ?Sized,
    R::State: fmt::Display,
{
    let mut observed: Option<R::State> = None;
    let outcome = poller.run(|| {
        let state = reader.read_state()?;
        let matched = expected.contains(&state);
        observed = Some(state);
        Ok::<bool, ProbeError>(matched)
    })?;

    match outcome {
        PollOutcome::Satisfied(report) => observed
            .map(|state| StateMatch {
                state,
                report,
            })
            .ok_or_else(|| ProbeError::Read("reader produced no state".to_string()).into()),
        PollOutcome::TimedOut(timeout) => Err(StateWaitError::Mismatch {
            expected_label: label_states(expected),
            observed_label: observed
                .as_ref()
                .map_or_else(|| "unknown".to_string(), |state| format!("'{state}'")),
            expected: expected.to_vec(),
            observed,
            timeout,
        }),
    }
}

/// Renders acceptable states as `'a'` or `'a' or 'b'`.
fn label_states<S: fmt::Display>(states: &[S]) -> String {
    states.iter().map(|state| format!("'{state}'")).collect::<Vec<_>>().join(" or ")
}

// ============================================================================
// SECTION: Transition Plans
// ============================================================================

/// Action fired before a step's wait.
type Trigger<'a> = Box<dyn FnMut() -> Result<(), ProbeError> + 'a>;

/// One step of a [`TransitionPlan`].
struct TransitionStep<'a, S> {
    /// Label used in reports and errors.
    label: String,
    /// Optional action fired before waiting.
    trigger: Option<Trigger<'a>>,
    /// State the step waits for.
    expected: S,
}

/// Completed step summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedStep {
    /// Step label.
    pub label: String,
    /// Poll summary for the step's wait.
    pub report: PollReport,
}

/// Summary of a fully executed plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionReport {
    /// Completed steps in execution order.
    pub steps: Vec<CompletedStep>,
}

/// Transition plan errors. `step` is 1-based.
#[derive(Debug, Error)]
pub enum TransitionError<S> {
    /// A trigger action failed before its wait started.
    #[error("step {step} ({label}): {error}")]
    Trigger {
        /// 1-based step number.
        step: usize,
        /// Step label.
        label: String,
        /// Trigger failure.
        error: ProbeError,
    },
    /// A step's wait failed.
    #[error("step {step} ({label}): {error}")]
    Wait {
        /// 1-based step number.
        step: usize,
        /// Step label.
        label: String,
        /// Wait failure.
        error: StateWaitError<S>,
    },
}

/// Ordered state-transition assertions.
pub struct TransitionPlan<'a, S> {
    /// Steps in execution order.
    steps: Vec<TransitionStep<'a, S>>,
}

impl<'a, S> TransitionPlan<'a, S> {
    /// Creates an empty plan.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            steps: Vec::new(),
        }
    }

    /// Appends a step that waits for `expected` without acting first.
    #[must_use]
    pub fn expect(mut self, label: impl Into<String>, expected: S) -> Self {
        self.steps.push(TransitionStep {
            label: label.into(),
            trigger: None,
            expected,
        });
        self
    }

    /// Appends a step that fires `trigger` and then waits for `expected`.
    #[must_use]
    pub fn trigger_then_expect<F>(mut self, label: impl Into<String>, trigger: F, expected: S) -> Self
    where
        F: FnMut() -> Result<(), ProbeError> + 'a,
    {
        self.steps.push(TransitionStep {
            label: label.into(),
            trigger: Some(Box::new(trigger)),
            expected,
        });
        self
    }

    /// Returns the number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true when the plan has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Executes every step in order against `reader`.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] for the first step whose trigger or wait
    /// fails. Later steps are not executed.
    pub fn run<C, O, R>(
        self,
        poller: &ConditionPoller<C, O>,
        reader: &mut R,
    ) -> Result<TransitionReport, TransitionError<S>>
    where
        C: Clock,
        O: PollObserver,
        R: StateReader<State = S> + ?Sized,
        S: Clone + PartialEq + fmt::Display,
    {
        let mut report = TransitionReport::default();
        for (index, step) in self.steps.into_iter().enumerate() {
            let number = index + 1;
            let TransitionStep {
                label,
                trigger,
                expected,
            } = step;
            if let Err(error) = trigger.map_or(Ok(()), |mut trigger| trigger()) {
                return Err(TransitionError::Trigger {
                    step: number,
                    label,
                    error,
                });
            }
            match wait_for_state(poller, reader, &expected) {
                Ok(matched) => {
                    tracing::debug!(step = number, label = label.as_str(), "transition step reached");
                    report.steps.push(CompletedStep {
                        label,
                        report: matched.report,
                    });
                }
                Err(error) => {
                    return Err(TransitionError::Wait {
                        step: number,
                        label,
                        error,
                    });
                }
            }
        }
        Ok(report)
    }
}

impl<S> Default for TransitionPlan<'_, S> {
    fn default() -> Self {
        Self::new()
    }
}
