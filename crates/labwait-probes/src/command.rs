// crates/labwait-probes/src/command.rs
// ============================================================================
// Module: Command Probes
// Description: Conditions backed by external commands and child processes.
// Purpose: Poll device-bridge and shell tools for expected output.
// Dependencies: labwait-core, std::process, tracing
// ============================================================================

//! ## Overview
//! A [`CommandProbe`] runs a command on every evaluation and checks its exit
//! status or stdout against an [`OutputExpectation`]. Typical uses: a bridge
//! client whose `get-state` prints `device` once connected, or a `ps | grep`
//! that prints a line once a process is up.
//!
//! Environment for the command is explicit in [`CommandSpec::env`]; the
//! probe never mutates the current process environment.
//!
//! [`wait_for_child_exit`] waits for a spawned child to exit and kills it
//! when the deadline passes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::io;
use std::io::Read;
use std::path::PathBuf;
use std::process::Child;
use std::process::Command;
use std::process::ExitStatus;
use std::process::Stdio;

use labwait_core::Clock;
use labwait_core::ConditionPoller;
use labwait_core::PollObserver;
use labwait_core::PollOutcome;
use tracing::debug;
use tracing::warn;

use crate::error::ProbeError;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum stdout bytes retained per evaluation; the rest is discarded.
pub const MAX_CAPTURED_OUTPUT_BYTES: usize = 64 * 1024;

// ============================================================================
// SECTION: Command Spec
// ============================================================================

/// External command description.
///
/// # Invariants
/// - `env` entries are added to the inherited environment of the child only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program to execute (resolved through `PATH`).
    pub program: String,
    /// Arguments passed verbatim.
    pub args: Vec<String>,
    /// Extra environment variables for the child.
    pub env: BTreeMap<String, String>,
    /// Working directory for the child.
    pub working_dir: Option<PathBuf>,
}

impl CommandSpec {
    /// Creates a spec for `program` with no arguments.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends arguments.
    #[must_use]
    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets an environment variable for the child.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Sets the working directory for the child.
    #[must_use]
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Renders the command line for logs and descriptions.
    #[must_use]
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Builds a [`Command`] with stdin closed and stdout captured.
    fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::null());
        for (key, value) in &self.env {
            command.env(key, value);
        }
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        command
    }
}

// ============================================================================
// SECTION: Expectations
// ============================================================================

/// What a command must produce for the condition to hold.
///
/// Stdout expectations ignore the exit status; tools such as `adb get-state`
/// exit non-zero while printing a meaningful state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputExpectation {
    /// Exit status is success.
    #[default]
    ExitSuccess,
    /// Trimmed stdout equals the value.
    StdoutEquals(String),
    /// Stdout contains the value.
    StdoutContains(String),
    /// Trimmed stdout is non-empty.
    StdoutNonEmpty,
}

impl OutputExpectation {
    /// Evaluates the expectation against an exit status and captured stdout.
    #[must_use]
    pub fn matches(&self, success: bool, stdout: &str) -> bool {
        match self {
            Self::ExitSuccess => success,
            Self::StdoutEquals(expected) => stdout.trim() == expected.trim(),
            Self::StdoutContains(needle) => stdout.contains(needle.as_str()),
            Self::StdoutNonEmpty => !stdout.trim().is_empty(),
        }
    }
}

// ============================================================================
// SECTION: Command Probe
// ============================================================================

/// Condition that runs a command and checks its result.
#[derive(Debug, Clone)]
pub struct CommandProbe {
    /// Command to run on each evaluation.
    spec: CommandSpec,
    /// Expected result.
    expectation: OutputExpectation,
    /// Trimmed stdout of the most recent run.
    last_stdout: Option<String>,
    /// Exit status of the most recent run.
    last_status: Option<ExitStatus>,
}

impl CommandProbe {
    /// Creates a probe for `spec` with `expectation`.
    #[must_use]
    pub const fn new(spec: CommandSpec, expectation: OutputExpectation) -> Self {
        Self {
            spec,
            expectation,
            last_stdout: None,
            last_status: None,
        }
    }

    /// Returns the command spec.
    #[must_use]
    pub const fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    /// Returns the trimmed stdout of the most recent run.
    #[must_use]
    pub fn last_stdout(&self) -> Option<&str> {
        self.last_stdout.as_deref()
    }

    /// Returns the exit status of the most recent run.
    #[must_use]
    pub const fn last_status(&self) -> Option<ExitStatus> {
        self.last_status
    }

    /// Runs the command once and evaluates the expectation.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Spawn`] when the command cannot be started and
    /// [`ProbeError::Wait`] when its output or exit status cannot be read.
    pub fn check(&mut self) -> Result<bool, ProbeError> {
        let mut child = self.spec.to_command().spawn().map_err(|err| ProbeError::Spawn {
            program: self.spec.program.clone(),
            message: err.to_string(),
        })?;
        let captured = read_bounded_stdout(&mut child);
        let status = child.wait().map_err(|err| ProbeError::Wait(err.to_string()))?;
        let captured = captured.map_err(|err| ProbeError::Wait(err.to_string()))?;
        let stdout = String::from_utf8_lossy(&captured);
        let success = status.success();
        let matched = self.expectation.matches(success, &stdout);
        debug!(
            command = self.spec.display().as_str(),
            success,
            matched,
            "command probe evaluated"
        );
        self.last_stdout = Some(stdout.trim().to_string());
        self.last_status = Some(status);
        Ok(matched)
    }
}

/// Reads at most [`MAX_CAPTURED_OUTPUT_BYTES`] of the child's stdout and
/// discards the rest so the child never blocks on a full pipe.
fn read_bounded_stdout(child: &mut Child) -> io::Result<Vec<u8>> {
    let Some(mut stdout) = child.stdout.take() else {
        return Ok(Vec::new());
    };
    let limit = u64::try_from(MAX_CAPTURED_OUTPUT_BYTES).unwrap_or(u64::MAX);
    let mut captured = Vec::new();
    (&mut stdout).take(limit).read_to_end(&mut captured)?;
    io::copy(&mut stdout, &mut io::sink())?;
    Ok(captured)
}

// ============================================================================
// SECTION: Child Exit
// ============================================================================

/// How a waited-on child ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildExit {
    /// The child exited on its own before the deadline.
    Exited(ExitStatus),
    /// The deadline passed; the child was killed and reaped.
    Killed(ExitStatus),
}

impl ChildExit {
    /// Returns the final exit status.
    #[must_use]
    pub const fn status(self) -> ExitStatus {
        match self {
            Self::Exited(status) | Self::Killed(status) => status,
        }
    }
}

/// Waits for `child` to exit, killing it when the deadline passes.
///
/// Callers usually ask the child to stop first (for example with a signal)
/// and use this to bound the shutdown.
///
/// # Errors
///
/// Returns [`ProbeError::Wait`] when the child's status cannot be queried or
/// the kill fails.
pub fn wait_for_child_exit<C, O>(
    poller: &ConditionPoller<C, O>,
    child: &mut Child,
) -> Result<ChildExit, ProbeError>
where
    C: Clock,
    O: PollObserver,
{
    let mut exited: Option<ExitStatus> = None;
    let outcome = poller.run(|| {
        exited = child.try_wait().map_err(|err| ProbeError::Wait(err.to_string()))?;
        Ok::<bool, ProbeError>(exited.is_some())
    })?;

    match (outcome, exited) {
        (PollOutcome::Satisfied(_), Some(status)) => Ok(ChildExit::Exited(status)),
        _ => {
            warn!(pid = child.id(), "child did not exit before deadline, killing");
            if let Err(err) = child.kill() {
                // An already-exited child reports InvalidInput; reaping below settles it.
                if err.kind() != std::io::ErrorKind::InvalidInput {
                    return Err(ProbeError::Wait(err.to_string()));
                }
            }
            let status = child.wait().map_err(|err| ProbeError::Wait(err.to_string()))?;
            Ok(ChildExit::Killed(status))
        }
    }
}
