// crates/labwait-cli/src/tests/summary.rs
// ============================================================================
// Module: Wait Summary Tests
// Description: Unit tests for the JSON summary line and exit codes.
// Dependencies: labwait-cli summary module, serde_json
// ============================================================================

use std::time::Duration;

use labwait_core::PollReport;
use labwait_core::PollTimeout;
use serde_json::Value;
use serde_json::json;

use crate::summary::EXIT_FAILED;
use crate::summary::EXIT_SATISFIED;
use crate::summary::EXIT_TIMED_OUT;
use crate::summary::WaitStatus;
use crate::summary::WaitSummary;

fn parse(summary: &WaitSummary) -> Value {
    serde_json::from_str(&summary.to_json_line().expect("encode")).expect("decode")
}

#[test]
fn satisfied_summary_has_counts() {
    let summary = WaitSummary::satisfied(
        "adb get-state",
        PollReport {
            attempts: 3,
            elapsed: Duration::from_millis(2_004),
        },
    );

    assert_eq!(
        parse(&summary),
        json!({"status": "satisfied", "description": "adb get-state", "attempts": 3, "elapsed_ms": 2004})
    );
}

#[test]
fn timed_out_summary_carries_last_error() {
    let timeout = PollTimeout {
        description: "modem".to_string(),
        timeout: Duration::from_secs(5),
        interval: Duration::from_secs(1),
        attempts: 6,
        elapsed: Duration::from_secs(5),
    };

    let summary = WaitSummary::timed_out(&timeout, Some("bridge offline".to_string()));

    assert_eq!(
        parse(&summary),
        json!({
            "status": "timed_out",
            "description": "modem",
            "attempts": 6,
            "elapsed_ms": 5000,
            "error": "bridge offline"
        })
    );
}

#[test]
fn failed_summary_omits_counts() {
    let summary = WaitSummary::failed("probe", "failed to spawn adb: not found");

    assert_eq!(
        parse(&summary),
        json!({"status": "failed", "description": "probe", "error": "failed to spawn adb: not found"})
    );
}

#[test]
fn exit_codes_follow_status() {
    assert_eq!(WaitStatus::Satisfied.exit_code(), EXIT_SATISFIED);
    assert_eq!(WaitStatus::TimedOut.exit_code(), EXIT_TIMED_OUT);
    assert_eq!(WaitStatus::Failed.exit_code(), EXIT_FAILED);
    assert_eq!((EXIT_SATISFIED, EXIT_FAILED, EXIT_TIMED_OUT), (0, 1, 2));
}
