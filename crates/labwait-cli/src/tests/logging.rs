// crates/labwait-cli/src/tests/logging.rs
// ============================================================================
// Module: Logging Setup Tests
// Description: Unit tests for filter directive parsing.
// Dependencies: labwait-cli logging module
// ============================================================================

use crate::logging::DEFAULT_LOG_FILTER;
use crate::logging::build_filter;

#[test]
fn default_filter_is_warn() {
    let filter = build_filter(None).expect("default filter parses");
    assert_eq!(filter.to_string(), DEFAULT_LOG_FILTER);
}

#[test]
fn custom_directives_are_accepted() {
    let filter = build_filter(Some("labwait_core=debug,warn")).expect("directive parses");
    assert!(filter.to_string().contains("labwait_core=debug"));
}

#[test]
fn malformed_directive_is_rejected() {
    assert!(build_filter(Some("labwait_core=loud")).is_err());
}
