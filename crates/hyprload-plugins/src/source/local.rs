//! Plugin sources backed by a user-managed directory.

use std::path::{Path, PathBuf};

use super::{InstallOutcome, build_and_publish};
use crate::environment::PluginEnvironment;
use crate::error::PluginError;
use crate::process::CommandExecutor;

/// A directory supplied directly by the user. Never cloned or pulled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSource {
    source_path: PathBuf,
}

impl LocalSource {
    /// Creates a source for `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: path.into(),
        }
    }

    /// Returns the user-supplied directory.
    #[must_use]
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Returns `true` when the directory exists.
    #[must_use]
    pub fn is_source_available(&self) -> bool {
        self.source_path.is_dir()
    }

    /// Local edits cannot be detected, so a local source is never current.
    #[must_use]
    pub const fn is_up_to_date() -> bool {
        false
    }

    /// Builds and publishes; fails if the directory is absent.
    pub(super) fn install<E: CommandExecutor>(
        &self,
        name: &str,
        env: &PluginEnvironment<E>,
    ) -> Result<InstallOutcome, PluginError> {
        if !self.is_source_available() {
            return Err(PluginError::SourceMissing {
                name: name.to_owned(),
                path: self.source_path.clone(),
            });
        }
        build_and_publish(&self.source_path, name, env)
    }
}
