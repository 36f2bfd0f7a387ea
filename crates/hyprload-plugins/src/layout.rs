//! On-disk layout of the plugins directory.
//!
//! ```text
//! <plugins-dir>/
//!   src/<segment>/     cloned or referenced source trees
//!   bin/<name>.so      published artifacts loaded by the compositor
//!   locks/<name>.lock  per-plugin advisory locks
//! ```
//!
//! All paths are pure functions of the plugins directory and are recomputed
//! on every run.

use std::path::{Path, PathBuf};

/// File extension of published plugin binaries.
pub const BINARY_EXTENSION: &str = "so";

/// Paths derived from the plugins directory.
///
/// # Example
///
/// ```
/// use hyprload_plugins::PluginLayout;
/// use std::path::Path;
///
/// let layout = PluginLayout::new("/home/me/.local/share/hyprload/plugins");
/// assert_eq!(
///     layout.binary_path("hyprbars"),
///     Path::new("/home/me/.local/share/hyprload/plugins/bin/hyprbars.so"),
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginLayout {
    plugins_dir: PathBuf,
}

impl PluginLayout {
    /// Creates a layout rooted at `plugins_dir`.
    #[must_use]
    pub fn new(plugins_dir: impl Into<PathBuf>) -> Self {
        Self {
            plugins_dir: plugins_dir.into(),
        }
    }

    /// Root of the layout.
    #[must_use]
    pub fn plugins_dir(&self) -> &Path {
        &self.plugins_dir
    }

    /// Directory holding source trees.
    #[must_use]
    pub fn source_dir(&self) -> PathBuf {
        self.plugins_dir.join("src")
    }

    /// Directory holding published binaries.
    #[must_use]
    pub fn binaries_dir(&self) -> PathBuf {
        self.plugins_dir.join("bin")
    }

    /// Directory holding lock files.
    #[must_use]
    pub fn locks_dir(&self) -> PathBuf {
        self.plugins_dir.join("locks")
    }

    /// Source tree location for a repository segment.
    #[must_use]
    pub fn source_path(&self, segment: &str) -> PathBuf {
        self.source_dir().join(segment)
    }

    /// Canonical published artifact for plugin `name`.
    #[must_use]
    pub fn binary_path(&self, name: &str) -> PathBuf {
        self.binaries_dir()
            .join(format!("{name}.{BINARY_EXTENSION}"))
    }

    /// Lock file guarding plugin `name`.
    #[must_use]
    pub fn lock_path(&self, name: &str) -> PathBuf {
        self.locks_dir().join(format!("{name}.lock"))
    }
}
