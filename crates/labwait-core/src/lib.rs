// crates/labwait-core/src/lib.rs
// ============================================================================
// Module: Lab Wait Core
// Description: Condition polling primitives for lab automation.
// Purpose: Wait for external state to hold within a deadline, then classify the result.
// Dependencies: thiserror, tracing
// ============================================================================

//! ## Overview
//! Lab automation waits on systems it does not control: a device bridge that
//! eventually reports `device`, a modem that eventually registers, a PID file
//! that eventually appears. This crate provides the [`ConditionPoller`] that
//! drives those waits and the data model around it.
//!
//! Invariants:
//! - A condition is evaluated at least once, even with a zero timeout.
//! - Condition errors propagate immediately; they are never retried.
//! - Sleeps never overshoot the deadline; the last evaluation lands on it.
//!
//! ```
//! use std::time::Duration;
//!
//! use labwait_core::ConditionPoller;
//! use labwait_core::ManualClock;
//! use labwait_core::PollConfig;
//!
//! let config = PollConfig::new(Duration::from_secs(10), Duration::from_secs(1), "counter")?;
//! let clock = ManualClock::new();
//! let poller = ConditionPoller::new(config).with_clock(&clock);
//! let mut counter = 0;
//! let report = poller.wait_bool(|| {
//!     counter += 1;
//!     counter >= 3
//! })?;
//! assert_eq!(report.attempts, 3);
//! assert_eq!(report.elapsed, Duration::from_secs(2));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod clock;
pub mod config;
pub mod observer;
pub mod outcome;
pub mod poller;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use clock::Clock;
pub use clock::ManualClock;
pub use clock::SystemClock;
pub use config::DEFAULT_POLL_INTERVAL;
pub use config::DEFAULT_POLL_TIMEOUT;
pub use config::PollConfig;
pub use config::PollConfigError;
pub use observer::NoopObserver;
pub use observer::PollAttempt;
pub use observer::PollObserver;
pub use outcome::Describe;
pub use outcome::FailWith;
pub use outcome::OnTimeout;
pub use outcome::PollError;
pub use outcome::PollOutcome;
pub use outcome::PollReport;
pub use outcome::PollTimeout;
pub use outcome::duration_millis;
pub use poller::ConditionPoller;
pub use poller::poll_for_condition;
