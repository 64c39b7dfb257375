// crates/labwait-cli/src/lib.rs
// ============================================================================
// Module: Lab Wait CLI Library
// Description: Shared helpers for the labwait command-line interface.
// Purpose: Provide reusable components (i18n, summaries, logging) for the binary and tests.
// Dependencies: serde, tracing-subscriber
// ============================================================================

//! ## Overview
//! This library houses the CLI's message catalog, the JSON wait summary, and
//! subscriber setup. The binary entry point (`src/main.rs`) imports these
//! helpers to keep all user-facing output consistent.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Internationalization helpers and message catalog.
pub mod i18n;
/// Subscriber installation for diagnostic logs.
pub mod logging;
/// JSON outcome summaries printed on stdout.
pub mod summary;

#[cfg(test)]
mod tests;
