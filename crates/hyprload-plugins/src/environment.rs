//! Explicit context shared by every source and build operation.
//!
//! Path discovery happens once, at start-up, in the caller. The resolved
//! locations travel through a [`PluginEnvironment`] instead of being looked
//! up ad hoc, together with the
//! [`CommandExecutor`](crate::process::CommandExecutor) used to shell out.

use std::path::{Path, PathBuf};

use crate::error::PluginError;
use crate::layout::PluginLayout;

/// Environment variable exported to build steps, pointing at the headers.
pub const HEADERS_ENV_VAR: &str = "HYPRLAND_HEADERS";

/// Location of the compositor headers plugin builds compile against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Toolchain {
    headers: Option<PathBuf>,
}

impl Toolchain {
    /// Creates a toolchain description; `None` means no headers were found.
    #[must_use]
    pub const fn new(headers: Option<PathBuf>) -> Self {
        Self { headers }
    }

    /// Returns the configured header location, if any.
    #[must_use]
    pub fn headers(&self) -> Option<&Path> {
        self.headers.as_deref()
    }

    /// Returns the header directory, checking it exists.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::HeadersNotFound`] when no location is
    /// configured or the location is not a directory.
    pub fn resolve_headers(&self) -> Result<&Path, PluginError> {
        match self.headers() {
            Some(path) if path.is_dir() => Ok(path),
            Some(path) => Err(PluginError::HeadersNotFound {
                searched: format!("'{}'", path.display()),
            }),
            None => Err(PluginError::HeadersNotFound {
                searched: String::from("no configured location"),
            }),
        }
    }
}

/// Executor, layout, and toolchain bundled for source operations.
#[derive(Debug, Clone)]
pub struct PluginEnvironment<E> {
    executor: E,
    layout: PluginLayout,
    toolchain: Toolchain,
}

impl<E> PluginEnvironment<E> {
    /// Creates an environment.
    #[must_use]
    pub const fn new(executor: E, layout: PluginLayout, toolchain: Toolchain) -> Self {
        Self {
            executor,
            layout,
            toolchain,
        }
    }

    /// Returns the plugins directory layout.
    #[must_use]
    pub const fn layout(&self) -> &PluginLayout {
        &self.layout
    }

    /// Returns the toolchain description.
    #[must_use]
    pub const fn toolchain(&self) -> &Toolchain {
        &self.toolchain
    }

    /// Returns the command executor.
    #[must_use]
    pub const fn executor(&self) -> &E {
        &self.executor
    }
}
