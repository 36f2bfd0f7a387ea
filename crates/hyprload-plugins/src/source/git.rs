//! Git-backed plugin sources.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::{InstallOutcome, SOURCE_TARGET, build_and_publish};
use crate::environment::PluginEnvironment;
use crate::error::PluginError;
use crate::layout::PluginLayout;
use crate::process::{CommandExecutor, ProcessCommand};

/// Branch cloned when a requirement does not name one.
pub const DEFAULT_BRANCH: &str = "main";

const GIT: &str = "git";
const GITHUB_PREFIX: &str = "https://github.com/";

/// Expands `owner/repo` shorthand to a GitHub HTTPS URL.
///
/// URLs already starting with `https://` or `git@` pass through unchanged.
///
/// # Example
///
/// ```
/// use hyprload_plugins::source::normalize_git_url;
///
/// assert_eq!(
///     normalize_git_url("hyprwm/hyprland-plugins"),
///     "https://github.com/hyprwm/hyprland-plugins.git",
/// );
/// assert_eq!(
///     normalize_git_url("git@github.com:hyprwm/hyprland-plugins.git"),
///     "git@github.com:hyprwm/hyprland-plugins.git",
/// );
/// ```
#[must_use]
pub fn normalize_git_url(url: &str) -> String {
    if url.starts_with("https://") || url.starts_with("git@") {
        url.to_owned()
    } else {
        format!("{GITHUB_PREFIX}{url}.git")
    }
}

/// Final path segment of a repository location, without a `.git` suffix.
///
/// Returns `None` when nothing usable remains.
pub(crate) fn repository_name(location: &str) -> Option<&str> {
    let trimmed = location.trim_end_matches('/');
    let last = trimmed.rsplit(['/', ':']).next().unwrap_or(trimmed);
    let segment = last.strip_suffix(".git").unwrap_or(last);
    (!segment.is_empty() && segment != "." && segment != "..").then_some(segment)
}

/// A repository cloned into `<plugins-dir>/src/<repository>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitSource {
    url: String,
    branch: String,
    source_path: PathBuf,
}

impl GitSource {
    /// Creates a source for `url` (shorthand or full URL) on `branch`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::InvalidRequirement`] when no directory name
    /// can be derived from the URL.
    pub fn new(
        url: &str,
        branch: impl Into<String>,
        layout: &PluginLayout,
    ) -> Result<Self, PluginError> {
        let normalized = normalize_git_url(url);
        let segment =
            repository_name(&normalized).ok_or_else(|| PluginError::InvalidRequirement {
                message: format!("cannot derive a source directory from '{normalized}'"),
            })?;
        let source_path = layout.source_path(segment);
        Ok(Self {
            url: normalized,
            branch: branch.into(),
            source_path,
        })
    }

    /// Returns the normalised repository URL.
    #[must_use]
    pub const fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns the tracked branch.
    #[must_use]
    pub const fn branch(&self) -> &str {
        self.branch.as_str()
    }

    /// Returns the clone location.
    #[must_use]
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Returns `true` when the clone location contains a `.git` directory.
    #[must_use]
    pub fn is_source_available(&self) -> bool {
        self.source_path.join(".git").exists()
    }

    /// Fetches the remote and reports whether the branch has no pending
    /// upstream commits. Any failure is reported as not up to date.
    #[must_use]
    pub fn is_up_to_date<E: CommandExecutor>(&self, env: &PluginEnvironment<E>) -> bool {
        let fetched = env
            .executor()
            .run(&self.git().args(["remote", "update"]))
            .is_ok_and(|output| output.success());
        if !fetched {
            debug!(
                target: SOURCE_TARGET,
                url = %self.url,
                "remote update failed"
            );
            return false;
        }

        let behind = env
            .executor()
            .run(&self.git().args(["rev-list", "--count", "HEAD..@{upstream}"]))
            .ok()
            .filter(|output| output.success())
            .and_then(|output| output.output().trim().parse::<u64>().ok());
        debug!(
            target: SOURCE_TARGET,
            url = %self.url,
            behind = ?behind,
            "checked upstream"
        );
        behind == Some(0)
    }

    /// Shallow-clones the branch into the source path.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Clone`] carrying the clone output on failure,
    /// or [`PluginError::Io`] if the source directory cannot be created.
    pub fn install_source<E: CommandExecutor>(
        &self,
        env: &PluginEnvironment<E>,
    ) -> Result<(), PluginError> {
        let parent = env.layout().source_dir();
        fs::create_dir_all(&parent).map_err(|err| PluginError::io(parent, err))?;

        info!(
            target: SOURCE_TARGET,
            url = %self.url,
            branch = %self.branch,
            path = %self.source_path.display(),
            "cloning plugin source"
        );

        let command = ProcessCommand::new(GIT)
            .arg("clone")
            .arg(&self.url)
            .arg(&self.source_path)
            .args(["--branch", self.branch.as_str(), "--depth", "1"]);
        let output = env.executor().run(&command)?;
        if output.success() {
            Ok(())
        } else {
            warn!(target: SOURCE_TARGET, url = %self.url, "clone failed");
            Err(PluginError::Clone {
                url: self.url.clone(),
                branch: self.branch.clone(),
                output: output.into_output(),
            })
        }
    }

    /// Clones when absent; otherwise builds and publishes.
    pub(super) fn install<E: CommandExecutor>(
        &self,
        name: &str,
        env: &PluginEnvironment<E>,
    ) -> Result<InstallOutcome, PluginError> {
        if !self.is_source_available() {
            self.install_source(env)?;
            return Ok(InstallOutcome::Cloned);
        }
        build_and_publish(&self.source_path, name, env)
    }

    /// Pulls the existing tree, then builds and publishes.
    pub(super) fn update<E: CommandExecutor>(
        &self,
        name: &str,
        env: &PluginEnvironment<E>,
    ) -> Result<InstallOutcome, PluginError> {
        info!(
            target: SOURCE_TARGET,
            path = %self.source_path.display(),
            "pulling plugin source"
        );
        let output = env.executor().run(&self.git().arg("pull"))?;
        if !output.success() {
            return Err(PluginError::Pull {
                path: self.source_path.clone(),
                output: output.into_output(),
            });
        }
        self.install(name, env)
    }

    fn git(&self) -> ProcessCommand {
        ProcessCommand::new(GIT).arg("-C").arg(&self.source_path)
    }
}
