//! Command-line argument definitions for `hyprload`.

use clap::{Parser, Subcommand};

/// Command-line interface for the hyprload plugin manager.
///
/// Configuration flags such as `--plugins-dir` are split off before this
/// parser runs and handed to the configuration loader instead.
#[derive(Parser, Debug)]
#[command(name = "hyprload", version, disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// The operation to perform on the required plugins.
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Operations over the requirement list.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum CliCommand {
    /// Fetches missing plugins, then builds and publishes every plugin.
    Install,
    /// Rebuilds plugins whose source has changed; fetches missing ones.
    Update,
    /// Rebuilds and republishes one plugin.
    Build {
        /// Plugin name as resolved from the requirement list.
        name: String,
    },
    /// Prints every required plugin with its source and binary path.
    List,
}
