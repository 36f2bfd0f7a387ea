//! Domain errors raised by plugin acquisition and build operations.
//!
//! All errors use a single `thiserror`-derived enum with structured context
//! so callers can inspect the failure programmatically. [`PluginError::kind`]
//! groups the variants into the coarse categories the orchestration loop
//! reports on. I/O errors are wrapped in `Arc` to satisfy the
//! `result_large_err` Clippy lint.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Coarse failure category of a [`PluginError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or malformed manifest fields, or a malformed requirement.
    Config,
    /// The build toolchain is not set up. Fatal and never retried.
    Environment,
    /// Fetching, updating, or locating plugin sources failed.
    Source,
    /// The build procedure could not be launched or exited unsuccessfully.
    Build,
    /// The build artifact is missing or could not be published.
    Artifact,
}

impl ErrorKind {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Environment => "environment",
            Self::Source => "source",
            Self::Build => "build",
            Self::Artifact => "artifact",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors arising from plugin operations.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The source tree has no `hyprload.toml`.
    #[error("manifest not found: source does not have a hyprload.toml at '{path}'")]
    ManifestNotFound {
        /// Path that was checked.
        path: PathBuf,
    },

    /// The manifest file exists but is not valid TOML.
    #[error("parse failure: {message}")]
    ManifestParse {
        /// Manifest path, when the text came from disk.
        path: Option<PathBuf>,
        /// Diagnostic reported by the TOML parser.
        message: String,
    },

    /// A plugin entry in the manifest is structurally invalid.
    #[error("invalid manifest for plugin '{plugin}': {message}")]
    InvalidManifest {
        /// Plugin key of the offending entry.
        plugin: String,
        /// Description of the validation failure.
        message: String,
    },

    /// The manifest has no entry for the requested plugin.
    #[error("no manifest for {name} in '{path}'")]
    NoManifestFor {
        /// Plugin name that was looked up.
        name: String,
        /// Source tree that was searched.
        path: PathBuf,
    },

    /// A requirement entry could not be turned into a requirement.
    #[error("invalid plugin requirement: {message}")]
    InvalidRequirement {
        /// Description of the problem.
        message: String,
    },

    /// Two requirements resolve to the same plugin name.
    #[error("plugin '{name}' is required more than once")]
    DuplicateRequirement {
        /// Resolved plugin name.
        name: String,
    },

    /// The compositor headers the build needs could not be located.
    #[error(
        "could not find hyprland headers (looked in {searched}); refer to \
         https://github.com/Duckonaut/hyprload#Setup"
    )]
    HeadersNotFound {
        /// Location that was checked, or a note that none was configured.
        searched: String,
    },

    /// Cloning a Git source failed.
    #[error("failed to clone plugin source '{url}' (branch {branch}): {output}")]
    Clone {
        /// Repository URL.
        url: String,
        /// Requested branch.
        branch: String,
        /// Combined output of the clone command.
        output: String,
    },

    /// Pulling an existing Git source failed.
    #[error("failed to update plugin source at '{path}': {output}")]
    Pull {
        /// Source tree that was pulled.
        path: PathBuf,
        /// Combined output of the pull command.
        output: String,
    },

    /// The source directory does not exist.
    #[error("source for {name} does not exist at '{path}'")]
    SourceMissing {
        /// Plugin name.
        name: String,
        /// Directory that was checked.
        path: PathBuf,
    },

    /// Another operation on the same plugin holds its lock.
    #[error("plugin '{name}' is locked by another operation ('{path}')")]
    Locked {
        /// Plugin name.
        name: String,
        /// Lock file path.
        path: PathBuf,
    },

    /// The external process could not be started at all.
    #[error("could not launch '{command}': {source}")]
    LaunchFailed {
        /// Rendered command line.
        command: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The build steps ran but exited with a non-zero status.
    #[error("failed to build plugin '{name}' (exit status {status}): {output}")]
    BuildFailed {
        /// Plugin name.
        name: String,
        /// Exit status of the build shell.
        status: i32,
        /// Combined output of the build.
        output: String,
    },

    /// The build reported success but the declared artifact is absent.
    #[error("plugin binary for '{name}' does not exist at '{path}'")]
    ArtifactMissing {
        /// Plugin name.
        name: String,
        /// Expected artifact location.
        path: PathBuf,
    },

    /// Copying the artifact into the binaries directory failed.
    #[error("failed to publish plugin '{name}' to '{path}': {source}")]
    Publish {
        /// Plugin name.
        name: String,
        /// Target binary path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// A filesystem operation on plugin state failed.
    #[error("I/O error at '{path}': {source}")]
    Io {
        /// Path involved in the failed operation.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl PluginError {
    /// Returns the failure category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ManifestNotFound { .. }
            | Self::ManifestParse { .. }
            | Self::InvalidManifest { .. }
            | Self::NoManifestFor { .. }
            | Self::InvalidRequirement { .. }
            | Self::DuplicateRequirement { .. } => ErrorKind::Config,
            Self::HeadersNotFound { .. } => ErrorKind::Environment,
            Self::Clone { .. }
            | Self::Pull { .. }
            | Self::SourceMissing { .. }
            | Self::Locked { .. }
            | Self::Io { .. } => ErrorKind::Source,
            Self::LaunchFailed { .. } | Self::BuildFailed { .. } => ErrorKind::Build,
            Self::ArtifactMissing { .. } | Self::Publish { .. } => ErrorKind::Artifact,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source: Arc::new(source),
        }
    }
}
