//! Where a plugin's code lives and how it is brought up to date.
//!
//! [`PluginSource`] is a closed set of two variants:
//!
//! - [`GitSource`] clones a branch shallowly into the plugins directory,
//!   checks freshness against its upstream, and pulls before rebuilding.
//! - [`LocalSource`] points at a directory the user manages. It is never
//!   fetched and is never considered up to date, so it is rebuilt on every
//!   run.
//!
//! Queries ([`PluginSource::is_source_available`],
//! [`PluginSource::is_up_to_date`]) are kept apart from effects
//! ([`PluginSource::install`], [`PluginSource::update`]) so an orchestration
//! loop can decide cheaply whether work is needed.
//!
//! A Git `install` on an absent tree only clones and reports
//! [`InstallOutcome::Cloned`]; the caller runs `install` again to build and
//! publish.

mod git;
mod local;

use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::Builder;
use tracing::info;

use crate::build::build_plugin;
use crate::environment::PluginEnvironment;
use crate::error::PluginError;
use crate::layout::PluginLayout;
use crate::manifest::PluginManifest;
use crate::process::CommandExecutor;

pub(crate) use self::git::repository_name;
pub use self::git::{DEFAULT_BRANCH, GitSource, normalize_git_url};
pub use self::local::LocalSource;

const SOURCE_TARGET: &str = "hyprload_plugins::source";

/// Result of a successful [`PluginSource::install`] or
/// [`PluginSource::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The source was fetched; nothing was built in this call.
    Cloned,
    /// The plugin was built and its artifact published.
    Published {
        /// Location of the published binary.
        path: PathBuf,
    },
}

/// Origin of a plugin's buildable code.
///
/// Equality compares the variant first, then its identifying fields, so a
/// Git and a Local source are never equal even when their paths coincide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginSource {
    /// A remote Git repository cloned into the plugins directory.
    Git(GitSource),
    /// A directory supplied by the user.
    Local(LocalSource),
}

impl PluginSource {
    /// Returns the directory the plugin is built in.
    #[must_use]
    pub fn source_path(&self) -> &Path {
        match self {
            Self::Git(git) => git.source_path(),
            Self::Local(local) => local.source_path(),
        }
    }

    /// Returns `true` when the source directory already holds usable content.
    #[must_use]
    pub fn is_source_available(&self) -> bool {
        match self {
            Self::Git(git) => git.is_source_available(),
            Self::Local(local) => local.is_source_available(),
        }
    }

    /// Returns `true` when no upstream changes are pending.
    ///
    /// Always `false` for local sources.
    #[must_use]
    pub fn is_up_to_date<E: CommandExecutor>(&self, env: &PluginEnvironment<E>) -> bool {
        match self {
            Self::Git(git) => git.is_up_to_date(env),
            Self::Local(_) => LocalSource::is_up_to_date(),
        }
    }

    /// Brings source content into existence.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Clone`] when a Git clone fails.
    pub fn install_source<E: CommandExecutor>(
        &self,
        env: &PluginEnvironment<E>,
    ) -> Result<(), PluginError> {
        match self {
            Self::Git(git) => git.install_source(env),
            Self::Local(_) => Ok(()),
        }
    }

    /// Builds plugin `name` in the source directory.
    ///
    /// # Errors
    ///
    /// Propagates [`build_plugin`] failures.
    pub fn build<E: CommandExecutor>(
        &self,
        name: &str,
        env: &PluginEnvironment<E>,
    ) -> Result<PluginManifest, PluginError> {
        build_plugin(env, self.source_path(), name)
    }

    /// Brings the plugin up to date: fetch if absent, otherwise build and
    /// publish.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error, leaving the source tree in
    /// place for inspection.
    pub fn install<E: CommandExecutor>(
        &self,
        name: &str,
        env: &PluginEnvironment<E>,
    ) -> Result<InstallOutcome, PluginError> {
        match self {
            Self::Git(git) => git.install(name, env),
            Self::Local(local) => local.install(name, env),
        }
    }

    /// Refreshes the source, then builds and publishes.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Pull`] if a Git tree cannot be pulled,
    /// otherwise the same errors as [`PluginSource::install`].
    pub fn update<E: CommandExecutor>(
        &self,
        name: &str,
        env: &PluginEnvironment<E>,
    ) -> Result<InstallOutcome, PluginError> {
        match self {
            Self::Git(git) => git.update(name, env),
            Self::Local(local) => local.install(name, env),
        }
    }
}

impl fmt::Display for PluginSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Git(git) => write!(f, "git {} ({})", git.url(), git.branch()),
            Self::Local(local) => write!(f, "local {}", local.source_path().display()),
        }
    }
}

impl From<GitSource> for PluginSource {
    fn from(source: GitSource) -> Self {
        Self::Git(source)
    }
}

impl From<LocalSource> for PluginSource {
    fn from(source: LocalSource) -> Self {
        Self::Local(source)
    }
}

/// Build, verify the declared artifact, and publish it. Shared by both
/// variants once their source tree is present.
fn build_and_publish<E: CommandExecutor>(
    source_path: &Path,
    name: &str,
    env: &PluginEnvironment<E>,
) -> Result<InstallOutcome, PluginError> {
    let manifest = build_plugin(env, source_path, name)?;
    let artifact = source_path.join(manifest.binary_output_path());
    if !artifact.is_file() {
        return Err(PluginError::ArtifactMissing {
            name: name.to_owned(),
            path: artifact,
        });
    }

    let path = publish_artifact(env.layout(), name, &artifact)?;
    info!(
        target: SOURCE_TARGET,
        plugin = name,
        binary = %path.display(),
        "plugin published"
    );
    Ok(InstallOutcome::Published { path })
}

/// Copies `artifact` to `<plugins-dir>/bin/<name>.so`.
///
/// The copy is written to a temporary file beside the target and renamed
/// over it, so a stale binary is replaced in one step and a failed copy
/// never leaves a truncated file behind.
fn publish_artifact(
    layout: &PluginLayout,
    name: &str,
    artifact: &Path,
) -> Result<PathBuf, PluginError> {
    let target = layout.binary_path(name);
    let publish_error = |source: io::Error| PluginError::Publish {
        name: name.to_owned(),
        path: target.clone(),
        source: Arc::new(source),
    };

    let directory = layout.binaries_dir();
    fs::create_dir_all(&directory).map_err(publish_error)?;

    let mut staged = Builder::new()
        .prefix(&format!(".{name}"))
        .suffix(".tmp")
        .tempfile_in(&directory)
        .map_err(publish_error)?;
    let mut input = File::open(artifact).map_err(publish_error)?;
    io::copy(&mut input, staged.as_file_mut()).map_err(publish_error)?;
    staged.as_file().sync_all().map_err(publish_error)?;
    let permissions = input.metadata().map_err(publish_error)?.permissions();
    staged
        .as_file()
        .set_permissions(permissions)
        .map_err(publish_error)?;
    staged
        .persist(&target)
        .map_err(|err| publish_error(err.error))?;
    Ok(target)
}
