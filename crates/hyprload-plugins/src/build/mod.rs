//! Manifest-driven build orchestration.
//!
//! [`build_plugin`] turns a plugin's manifest into one shell invocation: the
//! steps are joined with `&&` so the first failing step stops the rest, the
//! child runs inside the source tree, and the header location is exported
//! as [`HEADERS_ENV_VAR`]. Whatever the steps do to the filesystem is
//! outside this module's control; it only guarantees ordered execution and
//! faithful reporting of the aggregate status and output.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::environment::{HEADERS_ENV_VAR, PluginEnvironment};
use crate::error::PluginError;
use crate::manifest::{PluginManifest, load_plugin_manifest};
use crate::process::{CommandExecutor, ProcessCommand};

const BUILD_TARGET: &str = "hyprload_plugins::build";

/// Separator placed between build steps.
const STEP_SEPARATOR: &str = " && ";

/// Builds plugin `name` inside `source_path`.
///
/// The header location is resolved before anything else, then the plugin's
/// manifest is loaded from the source tree and its steps executed.
///
/// # Errors
///
/// Returns [`PluginError::HeadersNotFound`] when the toolchain is not set
/// up, manifest errors verbatim, [`PluginError::LaunchFailed`] when the
/// shell cannot start, and [`PluginError::BuildFailed`] carrying the
/// combined output when the steps exit non-zero.
pub fn build_plugin<E: CommandExecutor>(
    env: &PluginEnvironment<E>,
    source_path: &Path,
    name: &str,
) -> Result<PluginManifest, PluginError> {
    let headers = env.toolchain().resolve_headers()?;
    let manifest = load_plugin_manifest(source_path, name)?;

    let command = ProcessCommand::shell(build_script(&manifest))
        .current_dir(source_path)
        .env(HEADERS_ENV_VAR, headers);

    info!(
        target: BUILD_TARGET,
        plugin = name,
        source = %source_path.display(),
        steps = manifest.build_steps().len(),
        "building plugin"
    );

    let output = env.executor().run(&command)?;
    if !output.success() {
        warn!(
            target: BUILD_TARGET,
            plugin = name,
            status = output.status(),
            "build failed"
        );
        return Err(PluginError::BuildFailed {
            name: name.to_owned(),
            status: output.status(),
            output: output.into_output(),
        });
    }

    debug!(target: BUILD_TARGET, plugin = name, "build finished");
    Ok(manifest)
}

/// Joins the manifest's steps into a single short-circuiting script.
#[must_use]
pub fn build_script(manifest: &PluginManifest) -> String {
    manifest.build_steps().join(STEP_SEPARATOR)
}
