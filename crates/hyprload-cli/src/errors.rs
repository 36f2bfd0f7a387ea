//! Error types for the CLI runtime.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use hyprload_plugins::PluginError;
use thiserror::Error;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("failed to initialise logging: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("failed to load plugin requirements from {}: {source}", .path.display())]
    LoadRequirements { path: PathBuf, source: PluginError },
    #[error("no plugin named '{name}' is required")]
    UnknownPlugin { name: String },
    #[error("source for '{name}' is not installed; run `hyprload install` first")]
    NotInstalled { name: String },
    #[error("failed to write output: {0}")]
    Write(#[from] io::Error),
}
