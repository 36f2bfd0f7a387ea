//! Shared configuration for the hyprload binary.
//!
//! Values are layered by `ortho-config`: built-in defaults, then an optional
//! TOML file (`--config-path` or `HYPRLOAD_CONFIG_PATH`), then `HYPRLOAD_*`
//! environment variables, then command-line flags. Every field is optional
//! in the merged document; the accessors fill in the defaults from
//! the `defaults` module so callers never see a missing value.
//!
//! Configuration is resolved once at start-up. The plugin core receives the
//! resolved paths explicitly and never consults the environment itself.

use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

mod defaults;
mod logging;

pub use defaults::{
    APP_DIR_NAME, DEFAULT_LOG_FILTER, default_headers_path, default_log_filter,
    default_log_format, default_plugins_dir, default_requirements_path,
};
pub use logging::LogFormat;

/// Runtime configuration for the `hyprload` binary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "HYPRLOAD")]
pub struct Config {
    /// Root of the managed plugins directory.
    #[serde(default)]
    pub plugins_dir: Option<PathBuf>,
    /// Directory holding the compositor headers plugins compile against.
    #[serde(default)]
    pub headers_path: Option<PathBuf>,
    /// TOML file listing the plugins to install.
    #[serde(default)]
    pub requirements_path: Option<PathBuf>,
    /// Tracing filter expression, e.g. `info` or `hyprload_plugins=debug`.
    #[serde(default)]
    pub log_filter: Option<String>,
    /// Log output format.
    #[serde(default)]
    pub log_format: Option<LogFormat>,
}

impl Config {
    /// Plugins directory, defaulting to `<data dir>/hyprload/plugins`.
    #[must_use]
    pub fn plugins_dir(&self) -> PathBuf {
        self.plugins_dir.clone().unwrap_or_else(default_plugins_dir)
    }

    /// Header directory, defaulting to `<data dir>/hyprload/include/hyprland`.
    #[must_use]
    pub fn headers_path(&self) -> PathBuf {
        self.headers_path
            .clone()
            .unwrap_or_else(default_headers_path)
    }

    /// Requirement list, defaulting to `<config dir>/hypr/hyprload.toml`.
    #[must_use]
    pub fn requirements_path(&self) -> PathBuf {
        self.requirements_path
            .clone()
            .unwrap_or_else(default_requirements_path)
    }

    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    /// Log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format.unwrap_or_else(default_log_format)
    }
}
