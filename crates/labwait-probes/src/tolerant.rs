// crates/labwait-probes/src/tolerant.rs
// ============================================================================
// Module: Tolerant Conditions
// Description: Adapter that treats evaluation errors as "not yet".
// Dependencies: tracing
// ============================================================================

//! ## Overview
//! Conditions abort the poll on their first error. Some sources fail
//! transiently while a system boots (a bridge that refuses connections until
//! its daemon is up); [`Tolerant`] opts such a source into retrying by
//! mapping each error to `false` and recording it.

use std::fmt;

use tracing::debug;

/// Condition adapter that swallows evaluation errors.
///
/// # Invariants
/// - `swallowed` counts every error mapped to `false`.
/// - `last_error` holds the rendering of the most recent swallowed error.
#[derive(Debug)]
pub struct Tolerant<F> {
    /// Wrapped condition.
    condition: F,
    /// Errors swallowed so far.
    swallowed: u32,
    /// Most recent swallowed error.
    last_error: Option<String>,
}

impl<F> Tolerant<F> {
    /// Wraps `condition`.
    #[must_use]
    pub const fn new(condition: F) -> Self {
        Self {
            condition,
            swallowed: 0,
            last_error: None,
        }
    }

    /// Evaluates the wrapped condition, mapping errors to `false`.
    pub fn evaluate<E>(&mut self) -> bool
    where
        F: FnMut() -> Result<bool, E>,
        E: fmt::Display,
    {
        match (self.condition)() {
            Ok(satisfied) => satisfied,
            Err(err) => {
                self.swallowed = self.swallowed.saturating_add(1);
                let message = err.to_string();
                debug!(error = message.as_str(), swallowed = self.swallowed, "condition error tolerated");
                self.last_error = Some(message);
                false
            }
        }
    }

    /// Returns the number of swallowed errors.
    #[must_use]
    pub const fn swallowed_errors(&self) -> u32 {
        self.swallowed
    }

    /// Returns the most recent swallowed error.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
