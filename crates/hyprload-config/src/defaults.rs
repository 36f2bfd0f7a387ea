use std::env;
use std::path::PathBuf;

use dirs::{config_dir, data_dir};

use crate::logging::LogFormat;

/// Application directory name under the XDG data directory.
pub const APP_DIR_NAME: &str = "hyprload";

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression used by the binary.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the binary.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// `<data dir>/hyprload/plugins`.
#[must_use]
pub fn default_plugins_dir() -> PathBuf {
    data_base_directory().join(APP_DIR_NAME).join("plugins")
}

/// `<data dir>/hyprload/include/hyprland`, where the header installer
/// places the compositor headers.
#[must_use]
pub fn default_headers_path() -> PathBuf {
    data_base_directory()
        .join(APP_DIR_NAME)
        .join("include")
        .join("hyprland")
}

/// `<config dir>/hypr/hyprload.toml`, next to the compositor's own
/// configuration.
#[must_use]
pub fn default_requirements_path() -> PathBuf {
    config_base_directory().join("hypr").join("hyprload.toml")
}

fn data_base_directory() -> PathBuf {
    data_dir().unwrap_or_else(env::temp_dir)
}

fn config_base_directory() -> PathBuf {
    config_dir().unwrap_or_else(env::temp_dir)
}
