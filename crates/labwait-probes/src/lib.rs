// crates/labwait-probes/src/lib.rs
// ============================================================================
// Module: Lab Wait Probes
// Description: Condition sources and state assertions built on the poller.
// Purpose: Turn external observations into conditions the poller can drive.
// Dependencies: labwait-core, thiserror, tracing
// ============================================================================

//! ## Overview
//! Probes are the collaborators that supply conditions to
//! [`labwait_core::ConditionPoller`]: state readers with transition plans,
//! external commands, filesystem paths, and child-process exits.
//! Invariants:
//! - Probe errors propagate and abort the poll unless wrapped in [`Tolerant`].
//! - Probes never mutate process-wide state such as environment variables.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod command;
pub mod error;
pub mod path;
pub mod state;
pub mod tolerant;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use command::ChildExit;
pub use command::CommandProbe;
pub use command::CommandSpec;
pub use command::MAX_CAPTURED_OUTPUT_BYTES;
pub use command::OutputExpectation;
pub use command::wait_for_child_exit;
pub use error::ProbeError;
pub use path::PathCheck;
pub use path::PathProbe;
pub use state::CompletedStep;
pub use state::StateMatch;
pub use state::StateReader;
pub use state::StateWaitError;
pub use state::TransitionError;
pub use state::TransitionPlan;
pub use state::TransitionReport;
pub use state::wait_for_any_state;
pub use state::wait_for_state;
pub use tolerant::Tolerant;
