// crates/labwait-cli/src/main.rs
// ============================================================================
// Module: Lab Wait CLI Entry Point
// Description: Command dispatcher for condition waits from shell scripts.
// Purpose: Provide a localized CLI that waits on commands, paths, and configured probes.
// Dependencies: clap, labwait-config, labwait-core, labwait-probes, serde_json, thiserror, tracing
// ============================================================================

//! ## Overview
//! `labwait` polls a condition until it holds or a deadline passes, prints one
//! JSON summary line on stdout, and exits with 0 (satisfied), 2 (timed out),
//! or 1 (any other failure). Diagnostics go to stderr through `tracing`; all
//! other user-facing strings are routed through the i18n catalog.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::ArgAction;
use clap::ArgGroup;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use clap::error::ErrorKind;
use labwait_cli::i18n::Locale;
use labwait_cli::i18n::set_locale;
use labwait_cli::logging::init_logging;
use labwait_cli::summary::WaitStatus;
use labwait_cli::summary::WaitSummary;
use labwait_cli::t;
use labwait_config::EnvConfig;
use labwait_config::LabWaitConfig;
use labwait_config::LabWaitEnv;
use labwait_config::resolve_config_path;
use labwait_config::resolve_timeout;
use labwait_core::ConditionPoller;
use labwait_core::PollConfig;
use labwait_core::PollError;
use labwait_probes::CommandProbe;
use labwait_probes::CommandSpec;
use labwait_probes::OutputExpectation;
use labwait_probes::PathProbe;
use labwait_probes::ProbeError;
use labwait_probes::Tolerant;
use thiserror::Error;
use tracing::debug;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "labwait", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Preferred output language (overrides `LABWAIT_LANG`).
    #[arg(long, value_enum, value_name = "LANG", global = true)]
    lang: Option<LangArg>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Wait until a command produces the expected result.
    Command(CommandWaitCommand),
    /// Wait until a path appears, disappears, or holds an expected first line.
    Path(PathWaitCommand),
    /// Wait on a probe defined in the config file.
    Probe(ProbeWaitCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Poll timing flags shared by ad-hoc waits.
#[derive(Args, Debug, Default)]
struct PollArgs {
    /// Overall deadline in milliseconds.
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,
    /// Delay between evaluations in milliseconds.
    #[arg(long, value_name = "MS")]
    interval_ms: Option<u64>,
    /// Condition description used in summaries and timeout messages.
    #[arg(long, value_name = "TEXT")]
    description: Option<String>,
    /// Named profile from the config file supplying timings.
    #[arg(long, value_name = "NAME")]
    profile: Option<String>,
    /// Config file path (defaults to labwait.toml or `LABWAIT_CONFIG`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for the `command` wait.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("expectation").args(["expect_stdout", "expect_contains", "expect_nonempty"])))]
struct CommandWaitCommand {
    /// Poll timing flags.
    #[command(flatten)]
    poll: PollArgs,
    /// Hold when trimmed stdout equals this text.
    #[arg(long, value_name = "TEXT")]
    expect_stdout: Option<String>,
    /// Hold when stdout contains this text.
    #[arg(long, value_name = "TEXT")]
    expect_contains: Option<String>,
    /// Hold when stdout is non-empty.
    #[arg(long, action = ArgAction::SetTrue)]
    expect_nonempty: bool,
    /// Extra environment for the command (repeatable).
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_env_entry)]
    env: Vec<(String, String)>,
    /// Working directory for the command.
    #[arg(long, value_name = "DIR")]
    cwd: Option<PathBuf>,
    /// Treat spawn failures as "not yet" instead of aborting.
    #[arg(long, action = ArgAction::SetTrue)]
    tolerant: bool,
    /// Program and arguments, after `--`.
    #[arg(last = true, required = true, num_args = 1.., value_name = "PROGRAM")]
    argv: Vec<String>,
}

/// Arguments for the `path` wait.
#[derive(Args, Debug)]
struct PathWaitCommand {
    /// Poll timing flags.
    #[command(flatten)]
    poll: PollArgs,
    /// Path to watch.
    #[arg(value_name = "PATH")]
    path: PathBuf,
    /// Wait for the path to disappear instead.
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "first_line")]
    absent: bool,
    /// Wait for the file's first line to equal this text.
    #[arg(long, value_name = "TEXT")]
    first_line: Option<String>,
}

/// Arguments for the `probe` wait.
#[derive(Args, Debug)]
struct ProbeWaitCommand {
    /// Probe name from the config file.
    #[arg(value_name = "NAME")]
    name: String,
    /// Config file path (defaults to labwait.toml or `LABWAIT_CONFIG`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Overall deadline override in milliseconds.
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a labwait configuration file.
    Validate(ConfigValidateCommand),
}

/// Arguments for config validation.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Config file path (defaults to labwait.toml or `LABWAIT_CONFIG`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Supported CLI language selections.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum LangArg {
    /// English.
    En,
    /// Catalan.
    Ca,
}

impl From<LangArg> for Locale {
    fn from(value: LangArg) -> Self {
        match value {
            LangArg::En => Self::En,
            LangArg::Ca => Self::Ca,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return report_usage(&err),
    };
    let env = EnvConfig::load().map_err(|err| CliError::new(t!("env.load_failed", error = err)))?;
    let locale = resolve_locale(cli.lang, env.lang.as_deref())?;
    set_locale(locale);
    if locale != Locale::En {
        write_stderr_line(&t!("i18n.disclaimer.machine_translated"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }
    init_logging(env.log_filter.as_deref())
        .map_err(|err| CliError::new(t!("logging.init_failed", error = err)))?;

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Command(command) => command_wait(command, &env),
        Commands::Path(command) => command_path(command, &env),
        Commands::Probe(command) => command_probe(&command, &env),
        Commands::Config {
            command,
        } => command_config(command, &env),
    }
}

/// Prints a clap parse result and maps it onto the wait exit codes.
///
/// Help and version display exit 0; every usage error exits 1 so scripts
/// never confuse a typo with a timeout.
fn report_usage(err: &clap::Error) -> CliResult<ExitCode> {
    let stream = if err.use_stderr() { "stderr" } else { "stdout" };
    err.print().map_err(|io| CliError::new(output_error(stream, &io)))?;
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => Ok(ExitCode::SUCCESS),
        _ => Ok(ExitCode::from(WaitStatus::Failed.exit_code())),
    }
}

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Wait Commands
// ============================================================================

/// Executes the `command` wait.
fn command_wait(command: CommandWaitCommand, env: &EnvConfig) -> CliResult<ExitCode> {
    let expectation = if let Some(text) = command.expect_stdout {
        OutputExpectation::StdoutEquals(text)
    } else if let Some(text) = command.expect_contains {
        OutputExpectation::StdoutContains(text)
    } else if command.expect_nonempty {
        OutputExpectation::StdoutNonEmpty
    } else {
        OutputExpectation::ExitSuccess
    };
    let mut argv = command.argv.into_iter();
    let program = argv.next().unwrap_or_default();
    let mut spec = CommandSpec::new(program).args(argv);
    spec.env.extend(command.env);
    spec.working_dir = command.cwd;
    let poll = resolve_poll_config(&command.poll, env, spec.display())?;
    let mut probe = CommandProbe::new(spec, expectation);
    run_wait(poll, command.tolerant, || probe.check())
}

/// Executes the `path` wait.
fn command_path(command: PathWaitCommand, env: &EnvConfig) -> CliResult<ExitCode> {
    let shown = command.path.display().to_string();
    let (probe, fallback) = if command.absent {
        (PathProbe::absent(&command.path), format!("{shown} to be absent"))
    } else if let Some(line) = command.first_line {
        let fallback = format!("{shown} to read '{line}'");
        (PathProbe::first_line_equals(&command.path, line), fallback)
    } else {
        (PathProbe::exists(&command.path), format!("{shown} to exist"))
    };
    let poll = resolve_poll_config(&command.poll, env, fallback)?;
    run_wait(poll, false, || probe.check())
}

/// Executes the `probe` wait.
fn command_probe(command: &ProbeWaitCommand, env: &EnvConfig) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref(), env)?;
    let probe = config
        .probe(&command.name)
        .map_err(|err| CliError::new(t!("config.probe_failed", error = err)))?;
    let requested = command.timeout_ms.map_or(probe.poll.timeout(), Duration::from_millis);
    let poll = probe.poll.with_timeout(resolve_timeout(requested, env.timeout_floor));
    let mut condition = probe.condition;
    run_wait(poll, probe.tolerant, || condition.check())
}

/// Polls `condition` and reports the outcome.
///
/// Prints one JSON summary line on stdout; timeouts and check failures are
/// also described on stderr.
fn run_wait<F>(poll: PollConfig, tolerant: bool, condition: F) -> CliResult<ExitCode>
where
    F: FnMut() -> Result<bool, ProbeError>,
{
    let poller = ConditionPoller::new(poll);
    let description = poller.config().description().to_string();
    debug!(
        description = description.as_str(),
        timeout_ms = labwait_core::duration_millis(poller.config().timeout()),
        interval_ms = labwait_core::duration_millis(poller.config().interval()),
        tolerant,
        "starting wait"
    );
    let (result, last_error) = if tolerant {
        let mut tolerant = Tolerant::new(condition);
        let result = poller.wait(|| Ok::<bool, ProbeError>(tolerant.evaluate()));
        (result, tolerant.last_error().map(str::to_string))
    } else {
        (poller.wait(condition), None)
    };

    let summary = match result {
        Ok(report) => WaitSummary::satisfied(description, report),
        Err(PollError::Timeout(timeout)) => {
            write_stderr_line(&t!("wait.timed_out", error = timeout))
                .map_err(|err| CliError::new(output_error("stderr", &err)))?;
            if let Some(error) = &last_error {
                write_stderr_line(&t!("wait.timed_out.last_error", error = error))
                    .map_err(|err| CliError::new(output_error("stderr", &err)))?;
            }
            WaitSummary::timed_out(&timeout, last_error)
        }
        Err(PollError::Condition(error)) => {
            write_stderr_line(&t!("wait.condition_failed", error = error))
                .map_err(|err| CliError::new(output_error("stderr", &err)))?;
            WaitSummary::failed(description, error.to_string())
        }
    };
    emit_summary(&summary)
}

/// Prints the summary line and maps its status to an exit code.
fn emit_summary(summary: &WaitSummary) -> CliResult<ExitCode> {
    let line = summary
        .to_json_line()
        .map_err(|err| CliError::new(t!("wait.summary_failed", error = err)))?;
    write_stdout_line(&line).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(exit_code_for(summary.status))
}

/// Maps a wait status to a process exit code.
fn exit_code_for(status: WaitStatus) -> ExitCode {
    ExitCode::from(status.exit_code())
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand, env: &EnvConfig) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => command_config_validate(&command, env),
    }
}

/// Executes the config validation command.
fn command_config_validate(command: &ConfigValidateCommand, env: &EnvConfig) -> CliResult<ExitCode> {
    let path = resolve_config_path(command.config.as_deref(), env);
    let config = load_config(Some(&path), env)?;
    write_stdout_line(&t!(
        "config.validate.ok",
        path = path.display(),
        profiles = config.profiles.len(),
        probes = config.probes.len()
    ))
    .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Resolution Helpers
// ============================================================================

/// Loads the config file resolved from `explicit`, the environment, or the default name.
fn load_config(explicit: Option<&Path>, env: &EnvConfig) -> CliResult<LabWaitConfig> {
    let path = resolve_config_path(explicit, env);
    LabWaitConfig::load(&path).map_err(|err| {
        CliError::new(t!("config.load_failed", path = path.display(), error = err))
    })
}

/// Merges poll flags over profile timings and applies the environment floor.
///
/// The config file is only read when `--config`, `--profile`, or
/// `LABWAIT_CONFIG` asks for it. `fallback` describes the condition when
/// neither a flag nor a profile does.
fn resolve_poll_config(args: &PollArgs, env: &EnvConfig, fallback: String) -> CliResult<PollConfig> {
    let uses_config = args.config.is_some() || args.profile.is_some() || env.config_path.is_some();
    let config =
        if uses_config { load_config(args.config.as_deref(), env)? } else { LabWaitConfig::default() };
    let base = config
        .poll_config(args.profile.as_deref())
        .map_err(|err| CliError::new(t!("poll.invalid", error = err)))?;
    let description = match (&args.description, &args.profile) {
        (Some(description), _) => description.clone(),
        (None, Some(_)) => base.description().to_string(),
        (None, None) => fallback,
    };
    let timeout = args.timeout_ms.map_or(base.timeout(), Duration::from_millis);
    let interval = args.interval_ms.map_or(base.interval(), Duration::from_millis);
    PollConfig::new(resolve_timeout(timeout, env.timeout_floor), interval, description)
        .map_err(|err| CliError::new(t!("poll.invalid", error = err)))
}

/// Resolves the output locale from the flag, then the environment.
fn resolve_locale(lang: Option<LangArg>, env_lang: Option<&str>) -> CliResult<Locale> {
    if let Some(lang) = lang {
        return Ok(lang.into());
    }
    if let Some(value) = env_lang {
        return Locale::parse(value).ok_or_else(|| {
            CliError::new(t!("i18n.lang.invalid_env", env = LabWaitEnv::Lang.as_str(), value = value))
        });
    }
    Ok(Locale::En)
}

/// Parses a `KEY=VALUE` environment entry.
fn parse_env_entry(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(t!("command.env.invalid", value = raw)),
    }
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
