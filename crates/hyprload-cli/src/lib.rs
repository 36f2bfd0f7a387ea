//! Command-line runtime for the hyprload plugin manager.
//!
//! The module owns argument parsing, configuration bootstrapping, and the
//! per-plugin orchestration loop. It can be driven from the binary entry
//! point or from tests that substitute the configuration loader, the
//! command executor, and the output streams.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind as ClapErrorKind;
use hyprload_config::Config;
use hyprload_plugins::{
    CommandExecutor, PluginEnvironment, PluginError, PluginLayout, RequirementList,
    ShellExecutor, Toolchain,
};
use tracing::{debug, info};

mod cli;
mod commands;
mod config;
mod errors;
mod telemetry;

use cli::{Cli, CliCommand};
use commands::{Session, Summary};
use config::{ConfigLoader, OrthoConfigLoader, split_config_arguments};
pub(crate) use errors::AppError;

const CLI_TARGET: &str = "hyprload_cli";

/// CLI flags recognised by the configuration loader.
///
/// MAINTENANCE: keep in sync with the fields of `hyprload_config::Config`.
const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--plugins-dir",
    "--headers-path",
    "--requirements-path",
    "--log-filter",
    "--log-format",
];

struct CliRunner<'a, W: Write, R: Write, L: ConfigLoader, E: CommandExecutor> {
    stdout: &'a mut W,
    stderr: &'a mut R,
    loader: &'a L,
    executor: E,
}

impl<'a, W, R, L, E> CliRunner<'a, W, R, L, E>
where
    W: Write,
    R: Write,
    L: ConfigLoader,
    E: CommandExecutor,
{
    const fn new(stdout: &'a mut W, stderr: &'a mut R, loader: &'a L, executor: E) -> Self {
        Self {
            stdout,
            stderr,
            loader,
            executor,
        }
    }

    fn run<I>(self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        let Self {
            stdout,
            stderr,
            loader,
            executor,
        } = self;

        let arguments: Vec<OsString> = args.into_iter().collect();
        let split = split_config_arguments(&arguments);

        let cli = match Cli::try_parse_from(&split.command_arguments) {
            Ok(cli) => cli,
            Err(error) => return report_usage(error, stdout, stderr),
        };

        let result = loader
            .load(&split.config_arguments)
            .and_then(|config| {
                telemetry::initialise(&config)?;
                execute(&cli.command, &config, executor, &mut *stdout, &mut *stderr)
            });

        match result {
            Ok(summary) if summary.is_success() => ExitCode::SUCCESS,
            Ok(_) => ExitCode::FAILURE,
            Err(error) => {
                // Nothing more can be done if stderr itself is broken.
                drop(writeln!(stderr, "hyprload: {error}"));
                ExitCode::FAILURE
            }
        }
    }
}

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, R>(args: I, stdout: &mut W, stderr: &mut R) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    R: Write,
{
    CliRunner::new(stdout, stderr, &OrthoConfigLoader, ShellExecutor).run(args)
}

/// Runs the CLI with a substitute configuration loader and executor.
#[cfg(test)]
pub(crate) fn run_with<I, W, R, L, E>(
    args: I,
    stdout: &mut W,
    stderr: &mut R,
    loader: &L,
    executor: E,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    R: Write,
    L: ConfigLoader,
    E: CommandExecutor,
{
    CliRunner::new(stdout, stderr, loader, executor).run(args)
}

fn execute<E, W, R>(
    command: &CliCommand,
    config: &Config,
    executor: E,
    stdout: &mut W,
    stderr: &mut R,
) -> Result<Summary, AppError>
where
    E: CommandExecutor,
    W: Write,
    R: Write,
{
    let layout = PluginLayout::new(config.plugins_dir());
    let toolchain = Toolchain::new(Some(config.headers_path()));
    let requirements_path = config.requirements_path();
    let requirements = load_requirements(&requirements_path, &layout)?;
    debug!(
        target: CLI_TARGET,
        plugins_dir = %layout.plugins_dir().display(),
        requirements = requirements.len(),
        "configuration resolved"
    );

    let env = PluginEnvironment::new(executor, layout, toolchain);
    let mut session = Session::new(&env, &requirements, stdout, stderr);
    match command {
        CliCommand::Install => session.install_all(),
        CliCommand::Update => session.update_all(),
        CliCommand::Build { name } => session.build_one(name),
        CliCommand::List => session.list(),
    }
}

/// An absent requirement file means no plugins are wanted yet.
fn load_requirements(path: &Path, layout: &PluginLayout) -> Result<RequirementList, AppError> {
    match RequirementList::load(path, layout) {
        Ok(requirements) => Ok(requirements),
        Err(PluginError::Io { ref source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            info!(
                target: CLI_TARGET,
                path = %path.display(),
                "no requirement list found; nothing to do"
            );
            Ok(RequirementList::default())
        }
        Err(source) => Err(AppError::LoadRequirements {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// `--help` and `--version` go to stdout and succeed; real usage errors go
/// to stderr and fail.
fn report_usage<W: Write, R: Write>(
    error: clap::Error,
    stdout: &mut W,
    stderr: &mut R,
) -> ExitCode {
    match error.kind() {
        ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => {
            drop(write!(stdout, "{error}"));
            ExitCode::SUCCESS
        }
        _ => {
            drop(write!(stderr, "{}", AppError::CliUsage(error)));
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests;
