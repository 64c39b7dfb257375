// crates/labwait-probes/src/path.rs
// ============================================================================
// Module: Path Probes
// Description: Conditions over filesystem paths.
// Purpose: Wait for pid files, sockets, and status files to appear or vanish.
// Dependencies: std::fs, tracing
// ============================================================================

//! ## Overview
//! A [`PathProbe`] checks a path on each evaluation. A missing path is a
//! normal "not yet" answer; any other I/O failure (permissions, a directory
//! where a file was expected) is a [`ProbeError::Io`] and aborts the poll.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::ErrorKind;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;

use crate::error::ProbeError;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum bytes read when looking for the first line of a file.
const MAX_FIRST_LINE_BYTES: u64 = 4096;

// ============================================================================
// SECTION: Path Probe
// ============================================================================

/// What a [`PathProbe`] checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathCheck {
    /// The path exists.
    Exists,
    /// The path does not exist.
    Absent,
    /// The file's first line, trimmed, equals the value.
    FirstLineEquals(String),
}

/// Condition over a filesystem path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathProbe {
    /// Probed path.
    path: PathBuf,
    /// Check applied on each evaluation.
    check: PathCheck,
}

impl PathProbe {
    /// Creates a probe applying `check` to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, check: PathCheck) -> Self {
        Self {
            path: path.into(),
            check,
        }
    }

    /// Holds once `path` exists.
    #[must_use]
    pub fn exists(path: impl Into<PathBuf>) -> Self {
        Self::new(path, PathCheck::Exists)
    }

    /// Holds once `path` no longer exists.
    #[must_use]
    pub fn absent(path: impl Into<PathBuf>) -> Self {
        Self::new(path, PathCheck::Absent)
    }

    /// Holds once the first line of `path` equals `expected`.
    #[must_use]
    pub fn first_line_equals(path: impl Into<PathBuf>, expected: impl Into<String>) -> Self {
        Self::new(path, PathCheck::FirstLineEquals(expected.into()))
    }

    /// Returns the probed path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the configured check.
    #[must_use]
    pub const fn kind(&self) -> &PathCheck {
        &self.check
    }

    /// Evaluates the check once.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Io`] for I/O failures other than a missing path.
    pub fn check(&self) -> Result<bool, ProbeError> {
        let satisfied = match &self.check {
            PathCheck::Exists => self.exists_now()?,
            PathCheck::Absent => !self.exists_now()?,
            PathCheck::FirstLineEquals(expected) => {
                self.first_line()?.is_some_and(|line| line.trim() == expected.trim())
            }
        };
        debug!(path = %self.path.display(), satisfied, "path probe evaluated");
        Ok(satisfied)
    }

    /// Returns whether the path exists.
    fn exists_now(&self) -> Result<bool, ProbeError> {
        self.path.try_exists().map_err(|err| self.io_error(&err))
    }

    /// Reads the first line, or `None` when the file is missing.
    ///
    /// Invalid UTF-8 is decoded lossily so a half-written file reads as a
    /// mismatch.
    fn first_line(&self) -> Result<Option<String>, ProbeError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.io_error(&err)),
        };
        let mut reader = BufReader::new(file.take(MAX_FIRST_LINE_BYTES));
        let mut line = Vec::new();
        reader.read_until(b'\n', &mut line).map_err(|err| self.io_error(&err))?;
        Ok(Some(String::from_utf8_lossy(&line).into_owned()))
    }

    /// Wraps an I/O failure with the probed path.
    fn io_error(&self, err: &std::io::Error) -> ProbeError {
        ProbeError::Io {
            path: self.path.display().to_string(),
            message: err.to_string(),
        }
    }
}
