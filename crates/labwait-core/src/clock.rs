// crates/labwait-core/src/clock.rs
// ============================================================================
// Module: Poll Clocks
// Description: Time sources and sleep primitives used by the poller.
// Purpose: Separate wall-clock waiting from poll logic so loops are testable.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The poller never calls [`Instant::now`] or [`std::thread::sleep`]
//! directly; it goes through a [`Clock`]. Production code uses
//! [`SystemClock`]. Tests use [`ManualClock`], where sleeping advances a
//! virtual offset instead of blocking.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cell::Cell;
use std::time::Duration;
use std::time::Instant;

// ============================================================================
// SECTION: Clock Trait
// ============================================================================

/// Monotonic time source with a blocking sleep.
pub trait Clock {
    /// Returns the current monotonic instant.
    fn now(&self) -> Instant;

    /// Blocks the calling thread for `duration`.
    fn sleep(&self, duration: Duration);
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration);
    }
}

// ============================================================================
// SECTION: System Clock
// ============================================================================

/// Real monotonic clock backed by [`Instant`] and [`std::thread::sleep`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

// ============================================================================
// SECTION: Manual Clock
// ============================================================================

/// Virtual clock for deterministic tests.
///
/// # Invariants
/// - Time only moves through [`ManualClock::advance`] or [`Clock::sleep`].
/// - Not `Sync`; a manual clock belongs to a single test thread.
#[derive(Debug)]
pub struct ManualClock {
    /// Real instant captured at construction; virtual time is an offset from it.
    origin: Instant,
    /// Virtual time elapsed since `origin`.
    offset: Cell<Duration>,
    /// Number of sleeps requested through the [`Clock`] interface.
    sleeps: Cell<u32>,
}

impl ManualClock {
    /// Creates a manual clock at virtual time zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Cell::new(Duration::ZERO),
            sleeps: Cell::new(0),
        }
    }

    /// Advances virtual time without counting a sleep.
    ///
    /// Conditions use this to simulate slow evaluations.
    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get().saturating_add(by));
    }

    /// Returns virtual time elapsed since construction.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.offset.get()
    }

    /// Returns how many sleeps were requested.
    #[must_use]
    pub fn sleep_count(&self) -> u32 {
        self.sleeps.get()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin.checked_add(self.offset.get()).unwrap_or(self.origin)
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.set(self.sleeps.get().saturating_add(1));
        self.advance(duration);
    }
}
