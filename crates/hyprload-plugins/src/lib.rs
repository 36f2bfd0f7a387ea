//! Plugin acquisition and build orchestration for the Hyprland compositor.
//!
//! A user lists the plugins they want in a requirement file. Each
//! [`PluginRequirement`] owns a [`PluginSource`] (a Git repository or a
//! local directory) that knows how to fetch itself, check freshness, and
//! build through the plugin's `hyprload.toml` manifest. A successful build
//! publishes `<plugins-dir>/bin/<name>.so` for the compositor-side loader.
//!
//! All external commands run through a [`CommandExecutor`], and all resolved
//! paths travel in a [`PluginEnvironment`], so every operation can be
//! exercised in tests without touching the network or the real plugins
//! directory.
//!
//! Operations are blocking and single-threaded. A per-plugin
//! [`PluginLock`] keeps two invocations from working on the same plugin at
//! once.

pub mod build;
pub mod environment;
pub mod error;
pub mod layout;
pub mod lock;
pub mod manifest;
pub mod process;
pub mod requirement;
pub mod source;

#[cfg(test)]
mod tests;

pub use build::{build_plugin, build_script};
pub use environment::{HEADERS_ENV_VAR, PluginEnvironment, Toolchain};
pub use error::{ErrorKind, PluginError};
pub use layout::PluginLayout;
pub use lock::PluginLock;
pub use manifest::{
    HyprloadManifest, MANIFEST_FILE_NAME, PluginManifest, load_hyprload_manifest,
    load_plugin_manifest,
};
pub use process::{CommandExecutor, CommandOutput, ProcessCommand, ShellExecutor};
pub use requirement::{PluginRequirement, RequirementList};
pub use source::{DEFAULT_BRANCH, GitSource, InstallOutcome, LocalSource, PluginSource};
