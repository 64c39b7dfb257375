// crates/labwait-core/tests/poll_properties.rs
// ============================================================================
// Module: Poll Timing Properties
// Description: Property tests for evaluation counts and elapsed time.
// Purpose: Validate loop timing across arbitrary timeouts and intervals.
// Dependencies: labwait_core, proptest
// ============================================================================
//! ## Overview
//! Property coverage on a manual clock, plus a short real-clock check that
//! the system clock path honors the deadline.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::time::Duration;
use std::time::Instant;

use labwait_core::ConditionPoller;
use labwait_core::ManualClock;
use labwait_core::PollConfig;
use proptest::prelude::*;

fn config_ms(timeout_ms: u64, interval_ms: u64) -> PollConfig {
    PollConfig::new(
        Duration::from_millis(timeout_ms),
        Duration::from_millis(interval_ms),
        "property condition",
    )
    .expect("valid poll config")
}

proptest! {
    #[test]
    fn success_after_n_evaluations_takes_n_minus_one_intervals(
        interval_ms in 1_u64 .. 500,
        needed in 1_u32 .. 20,
        slack in 0_u64 .. 5,
    ) {
        let timeout_ms = interval_ms * (u64::from(needed) + slack);
        let clock = ManualClock::new();
        let poller = ConditionPoller::new(config_ms(timeout_ms, interval_ms)).with_clock(&clock);
        let mut calls = 0_u32;

        let report = poller.wait_bool(|| {
            calls += 1;
            calls >= needed
        });

        let report = report.expect("condition should hold before the deadline");
        prop_assert_eq!(report.attempts, needed);
        prop_assert_eq!(report.elapsed, Duration::from_millis(interval_ms * u64::from(needed - 1)));
    }

    #[test]
    fn never_true_times_out_within_one_interval_of_deadline(
        timeout_ms in 0_u64 .. 5_000,
        interval_ms in 1_u64 .. 1_000,
    ) {
        let clock = ManualClock::new();
        let poller = ConditionPoller::new(config_ms(timeout_ms, interval_ms)).with_clock(&clock);

        let timeout = poller.wait_bool(|| false).expect_err("condition never holds");

        let deadline = Duration::from_millis(timeout_ms);
        prop_assert!(timeout.elapsed >= deadline);
        prop_assert!(timeout.elapsed <= deadline + Duration::from_millis(interval_ms));
        prop_assert!(timeout.attempts >= 1);
    }

    #[test]
    fn error_aborts_before_any_outcome(
        fail_on in 1_u32 .. 10,
    ) {
        let clock = ManualClock::new();
        let poller = ConditionPoller::new(config_ms(60_000, 100)).with_clock(&clock);
        let mut calls = 0_u32;

        let result = poller.run(|| {
            calls += 1;
            if calls == fail_on { Err(calls) } else { Ok(false) }
        });

        prop_assert_eq!(result, Err(fail_on));
        prop_assert_eq!(calls, fail_on);
    }
}

#[test]
fn system_clock_poll_honors_deadline() {
    let poller = ConditionPoller::new(config_ms(60, 10));
    let start = Instant::now();

    let timeout = poller.wait_bool(|| false).expect_err("condition never holds");

    let elapsed = start.elapsed();
    assert!(timeout.elapsed >= Duration::from_millis(60));
    assert!(elapsed >= Duration::from_millis(60));
    assert!(elapsed < Duration::from_secs(5), "poll overshot: {elapsed:?}");
}
