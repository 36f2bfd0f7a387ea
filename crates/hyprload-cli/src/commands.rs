//! The orchestration loop over the requirement list.
//!
//! Each plugin is handled independently: a failure is reported on stderr
//! and the loop moves on. The caller turns the returned [`Summary`] into
//! the process exit status.

use std::io::Write;
use std::path::PathBuf;

use hyprload_plugins::{
    CommandExecutor, InstallOutcome, PluginEnvironment, PluginError, PluginRequirement,
    PluginSource, RequirementList,
};
use tracing::{info, warn};

use crate::AppError;

const COMMANDS_TARGET: &str = "hyprload_cli::commands";

/// What happened to one plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Progress {
    /// A fresh binary was published.
    Published(PathBuf),
    /// Source was fetched but nothing was built.
    Fetched,
    /// Upstream has no new commits; nothing was done.
    UpToDate,
}

impl From<InstallOutcome> for Progress {
    fn from(outcome: InstallOutcome) -> Self {
        match outcome {
            InstallOutcome::Cloned => Self::Fetched,
            InstallOutcome::Published { path } => Self::Published(path),
        }
    }
}

/// Tally of a run over several plugins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Summary {
    pub(crate) succeeded: usize,
    pub(crate) failed: usize,
}

impl Summary {
    pub(crate) const fn is_success(self) -> bool {
        self.failed == 0
    }
}

/// Streams and state shared by every command.
pub(crate) struct Session<'a, E, W, R> {
    env: &'a PluginEnvironment<E>,
    requirements: &'a RequirementList,
    stdout: &'a mut W,
    stderr: &'a mut R,
}

impl<'a, E, W, R> Session<'a, E, W, R>
where
    E: CommandExecutor,
    W: Write,
    R: Write,
{
    pub(crate) fn new(
        env: &'a PluginEnvironment<E>,
        requirements: &'a RequirementList,
        stdout: &'a mut W,
        stderr: &'a mut R,
    ) -> Self {
        Self {
            env,
            requirements,
            stdout,
            stderr,
        }
    }

    /// Installs every plugin. A Git plugin cloned by the first `install`
    /// is built by a second one in the same run.
    pub(crate) fn install_all(&mut self) -> Result<Summary, AppError> {
        let env = self.env;
        self.for_each(|requirement| install_fully(requirement, env))
    }

    /// Updates every plugin, installing those whose source is absent.
    ///
    /// Only a plugin whose binary is already published and whose source has
    /// nothing new upstream is skipped; a fetched but unbuilt source is
    /// built even when it is current.
    pub(crate) fn update_all(&mut self) -> Result<Summary, AppError> {
        let env = self.env;
        self.for_each(|requirement| {
            let source = requirement.source();
            if !source.is_source_available() {
                return install_fully(requirement, env);
            }
            if requirement.binary_path().is_file() && source.is_up_to_date(env) {
                return Ok(Progress::UpToDate);
            }
            requirement.update(env).map(Progress::from)
        })
    }

    /// Rebuilds and republishes the plugin named `name`.
    pub(crate) fn build_one(&mut self, name: &str) -> Result<Summary, AppError> {
        let requirement =
            self.requirements
                .get(name)
                .ok_or_else(|| AppError::UnknownPlugin {
                    name: name.to_owned(),
                })?;
        // A missing local directory is reported by the install itself.
        let source = requirement.source();
        if matches!(source, PluginSource::Git(_)) && !source.is_source_available() {
            return Err(AppError::NotInstalled {
                name: name.to_owned(),
            });
        }

        let outcome = requirement.install(self.env).map(Progress::from);
        let mut summary = Summary::default();
        self.report(requirement, outcome, &mut summary)?;
        Ok(summary)
    }

    /// Prints `name<TAB>source<TAB>binary` for every requirement.
    pub(crate) fn list(&mut self) -> Result<Summary, AppError> {
        for requirement in self.requirements {
            writeln!(
                self.stdout,
                "{}\t{}\t{}",
                requirement.name(),
                requirement.source(),
                requirement.binary_path().display()
            )?;
        }
        Ok(Summary {
            succeeded: self.requirements.len(),
            failed: 0,
        })
    }

    fn for_each<F>(&mut self, mut operation: F) -> Result<Summary, AppError>
    where
        F: FnMut(&PluginRequirement) -> Result<Progress, PluginError>,
    {
        let mut summary = Summary::default();
        for requirement in self.requirements {
            let outcome = operation(requirement);
            self.report(requirement, outcome, &mut summary)?;
        }
        info!(
            target: COMMANDS_TARGET,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "run finished"
        );
        Ok(summary)
    }

    fn report(
        &mut self,
        requirement: &PluginRequirement,
        outcome: Result<Progress, PluginError>,
        summary: &mut Summary,
    ) -> Result<(), AppError> {
        let name = requirement.name();
        match outcome {
            Ok(Progress::Published(path)) => {
                summary.succeeded += 1;
                writeln!(self.stdout, "{name}: published {}", path.display())?;
            }
            Ok(Progress::Fetched) => {
                summary.succeeded += 1;
                writeln!(self.stdout, "{name}: source fetched, not yet built")?;
            }
            Ok(Progress::UpToDate) => {
                summary.succeeded += 1;
                writeln!(self.stdout, "{name}: up to date")?;
            }
            Err(error) => {
                summary.failed += 1;
                warn!(
                    target: COMMANDS_TARGET,
                    plugin = name,
                    kind = %error.kind(),
                    "plugin failed"
                );
                writeln!(self.stderr, "{name}: {error}")?;
            }
        }
        Ok(())
    }
}

/// Runs `install`, and once more if the first call only fetched the source.
fn install_fully<E: CommandExecutor>(
    requirement: &PluginRequirement,
    env: &PluginEnvironment<E>,
) -> Result<Progress, PluginError> {
    match requirement.install(env)? {
        InstallOutcome::Cloned => requirement.install(env).map(Progress::from),
        published @ InstallOutcome::Published { .. } => Ok(Progress::from(published)),
    }
}
