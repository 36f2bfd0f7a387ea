//! Blocking execution of external commands.
//!
//! Every component that shells out (Git operations, build steps) goes
//! through the [`CommandExecutor`] trait so tests can substitute a recording
//! double. [`ShellExecutor`] is the production implementation: it spawns the
//! process with stdout and stderr joined on one pipe, reads the combined
//! stream to EOF, and waits for the exit status. The calling thread is
//! blocked for the full duration of the command; there is no timeout.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;

use tracing::debug;

use crate::error::PluginError;

const PROCESS_TARGET: &str = "hyprload_plugins::process";

/// Shell used by [`ProcessCommand::shell`].
const SHELL: &str = "sh";

/// Status reported when the process was terminated by a signal.
const SIGNALLED_STATUS: i32 = -1;

/// Description of a command to run.
///
/// The working directory and extra environment apply to the child process
/// only; the caller's own working directory is never changed.
///
/// # Example
///
/// ```
/// use hyprload_plugins::process::ProcessCommand;
///
/// let command = ProcessCommand::new("git")
///     .args(["-C", "/tmp/src", "pull"]);
/// assert_eq!(command.to_string(), "git -C /tmp/src pull");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessCommand {
    program: OsString,
    args: Vec<OsString>,
    current_dir: Option<PathBuf>,
    envs: Vec<(OsString, OsString)>,
}

impl ProcessCommand {
    /// Creates a command that runs `program` with no arguments.
    #[must_use]
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
            current_dir: None,
            envs: Vec::new(),
        }
    }

    /// Creates a command that runs `script` through the platform shell.
    #[must_use]
    pub fn shell(script: impl AsRef<OsStr>) -> Self {
        Self::new(SHELL).arg("-c").arg(script)
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Appends several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|arg| arg.as_ref().to_os_string()));
        self
    }

    /// Runs the child in `dir`.
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Exports `key=value` into the child's environment.
    #[must_use]
    pub fn env(mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
        self.envs
            .push((key.as_ref().to_os_string(), value.as_ref().to_os_string()));
        self
    }

    /// Returns the program to execute.
    #[must_use]
    pub fn program(&self) -> &OsStr {
        &self.program
    }

    /// Returns the arguments.
    #[must_use]
    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }

    /// Returns the working directory of the child, if set.
    #[must_use]
    pub fn working_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    /// Returns the extra environment variables.
    #[must_use]
    pub fn envs(&self) -> &[(OsString, OsString)] {
        &self.envs
    }

    fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        command.envs(self.envs.iter().map(|(key, value)| (key, value)));
        command
    }
}

impl fmt::Display for ProcessCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Exit status and combined stdout/stderr of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    status: i32,
    output: String,
}

impl CommandOutput {
    /// Creates an output record.
    #[must_use]
    pub fn new(status: i32, output: impl Into<String>) -> Self {
        Self {
            status,
            output: output.into(),
        }
    }

    /// Returns the exit status, `-1` when the process was signalled.
    #[must_use]
    pub const fn status(&self) -> i32 {
        self.status
    }

    /// Returns the captured output.
    #[must_use]
    pub const fn output(&self) -> &str {
        self.output.as_str()
    }

    /// Returns `true` when the exit status is zero.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.status == 0
    }

    /// Consumes the record, returning the captured output.
    #[must_use]
    pub fn into_output(self) -> String {
        self.output
    }
}

/// Trait abstracting process execution for testability.
pub trait CommandExecutor {
    /// Runs `command` to completion.
    ///
    /// A process that starts and exits with a non-zero status is **not** an
    /// error at this level; callers inspect [`CommandOutput::status`].
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::LaunchFailed`] if the process cannot be
    /// started or its output cannot be collected.
    fn run(&self, command: &ProcessCommand) -> Result<CommandOutput, PluginError>;
}

impl<E: CommandExecutor + ?Sized> CommandExecutor for &E {
    fn run(&self, command: &ProcessCommand) -> Result<CommandOutput, PluginError> {
        (**self).run(command)
    }
}

/// Executes commands as real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellExecutor;

impl CommandExecutor for ShellExecutor {
    fn run(&self, command: &ProcessCommand) -> Result<CommandOutput, PluginError> {
        let launch_failed = |err: std::io::Error| PluginError::LaunchFailed {
            command: command.to_string(),
            source: Arc::new(err),
        };

        debug!(
            target: PROCESS_TARGET,
            command = %command,
            dir = ?command.working_dir(),
            "running command"
        );

        let (mut reader, writer) = std::io::pipe().map_err(launch_failed)?;
        let stderr_writer = writer.try_clone().map_err(launch_failed)?;

        let mut child = {
            let mut process = command.to_command();
            process
                .stdin(Stdio::null())
                .stdout(writer)
                .stderr(stderr_writer);
            // `process` owns the parent's copies of the write end; it must be
            // dropped before reading or EOF never arrives.
            process.spawn().map_err(launch_failed)?
        };

        let mut bytes = Vec::new();
        let read_result = reader.read_to_end(&mut bytes);
        let exit = child.wait().map_err(launch_failed)?;
        read_result.map_err(launch_failed)?;

        let status = exit.code().unwrap_or(SIGNALLED_STATUS);
        debug!(
            target: PROCESS_TARGET,
            command = %command,
            status,
            output_bytes = bytes.len(),
            "command finished"
        );

        Ok(CommandOutput::new(
            status,
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    }
}
