//! Build manifest types for plugin source trees.
//!
//! Every source tree carries a `hyprload.toml` at its root. Each top-level
//! table in that file describes one plugin: its metadata, the artifact the
//! build produces, and the ordered shell steps that produce it. Parsing is
//! total: either a fully valid [`HyprloadManifest`] is returned or a
//! [`PluginError`] explains which field is wrong.

use std::path::{Path, PathBuf};

use toml::{Table, Value};
use tracing::debug;

use crate::error::PluginError;

/// File name of the build manifest at a source root.
pub const MANIFEST_FILE_NAME: &str = "hyprload.toml";

/// Version reported when a manifest omits one.
pub const DEFAULT_VERSION: &str = "0.0.0";

/// Description reported when a manifest omits one.
pub const DEFAULT_DESCRIPTION: &str = "No description provided";

const MANIFEST_TARGET: &str = "hyprload_plugins::manifest";

/// Build description of a single plugin.
///
/// # Example
///
/// ```
/// use hyprload_plugins::HyprloadManifest;
///
/// let manifest = HyprloadManifest::parse(
///     r#"
///     [widget]
///     build.steps = ["make"]
///     "#,
/// )
/// .expect("valid manifest");
///
/// let widget = manifest.find("widget").expect("widget entry");
/// assert_eq!(widget.version(), "0.0.0");
/// assert_eq!(widget.binary_output_path().to_str(), Some("widget.so"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginManifest {
    name: String,
    authors: Vec<String>,
    version: String,
    description: String,
    binary_output_path: PathBuf,
    build_steps: Vec<String>,
}

impl PluginManifest {
    /// Builds a manifest from the table stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::InvalidManifest`] if the `build` table or its
    /// `steps` array is missing, if any step or author is not a string, or
    /// if an optional scalar field has the wrong type.
    pub fn from_table(name: impl Into<String>, table: &Table) -> Result<Self, PluginError> {
        let plugin: String = name.into();
        let invalid = |message: &str| PluginError::InvalidManifest {
            plugin: plugin.clone(),
            message: message.to_owned(),
        };

        let authors = match (table.get("authors"), table.get("author")) {
            (Some(Value::Array(values)), _) => string_array(values)
                .ok_or_else(|| invalid("authors must be strings"))?,
            (Some(_), _) => return Err(invalid("authors must be an array of strings")),
            (None, Some(Value::String(author))) => vec![author.clone()],
            (None, Some(_)) => return Err(invalid("author must be a string")),
            (None, None) => Vec::new(),
        };

        let version = optional_string(table, "version")
            .map_err(|()| invalid("version must be a string"))?
            .unwrap_or_else(|| DEFAULT_VERSION.to_owned());
        let description = optional_string(table, "description")
            .map_err(|()| invalid("description must be a string"))?
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_owned());

        let build = table
            .get("build")
            .and_then(Value::as_table)
            .ok_or_else(|| invalid("plugin must have a build table"))?;

        let binary_output_path = optional_string(build, "output")
            .map_err(|()| invalid("build.output must be a string"))?
            .map_or_else(|| PathBuf::from(format!("{plugin}.so")), PathBuf::from);

        let steps = build
            .get("steps")
            .and_then(Value::as_array)
            .ok_or_else(|| invalid("plugin must have build steps"))?;
        let build_steps =
            string_array(steps).ok_or_else(|| invalid("build step must be a string"))?;
        if build_steps.is_empty() {
            return Err(invalid("plugin must have build steps"));
        }

        Ok(Self {
            name: plugin,
            authors,
            version,
            description,
            binary_output_path,
            build_steps,
        })
    }

    /// Returns the plugin name, i.e. its key in the manifest.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the declared authors, possibly empty.
    #[must_use]
    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    /// Returns the plugin version.
    #[must_use]
    pub const fn version(&self) -> &str {
        self.version.as_str()
    }

    /// Returns the plugin description.
    #[must_use]
    pub const fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the artifact path, relative to the source root.
    #[must_use]
    pub fn binary_output_path(&self) -> &Path {
        &self.binary_output_path
    }

    /// Returns the build steps in execution order. Never empty.
    #[must_use]
    pub fn build_steps(&self) -> &[String] {
        &self.build_steps
    }
}

/// All plugin manifests declared by one source tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HyprloadManifest {
    plugins: Vec<PluginManifest>,
}

impl HyprloadManifest {
    /// Parses manifest text.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::ManifestParse`] for malformed TOML and
    /// [`PluginError::InvalidManifest`] for an invalid plugin entry.
    pub fn parse(text: &str) -> Result<Self, PluginError> {
        let table = text
            .parse::<Table>()
            .map_err(|err| PluginError::ManifestParse {
                path: None,
                message: err.to_string(),
            })?;
        Self::from_table(&table)
    }

    /// Builds the manifest from an already parsed table. Non-table entries
    /// are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::InvalidManifest`] for the first invalid entry.
    pub fn from_table(table: &Table) -> Result<Self, PluginError> {
        let plugins = table
            .iter()
            .filter_map(|(key, value)| value.as_table().map(|entry| (key, entry)))
            .map(|(key, entry)| PluginManifest::from_table(key.as_str(), entry))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { plugins })
    }

    /// Returns the plugin entries in file order.
    #[must_use]
    pub fn plugins(&self) -> &[PluginManifest] {
        &self.plugins
    }

    /// Returns the entry whose name matches `name` exactly.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&PluginManifest> {
        self.plugins.iter().find(|plugin| plugin.name() == name)
    }

    /// Consumes the manifest, returning the entry named `name`.
    fn into_plugin(self, name: &str) -> Option<PluginManifest> {
        self.plugins.into_iter().find(|plugin| plugin.name() == name)
    }
}

/// Loads `<source_path>/hyprload.toml`.
///
/// # Errors
///
/// Returns [`PluginError::ManifestNotFound`] if the file is absent,
/// [`PluginError::ManifestParse`] if it cannot be read or parsed, and
/// [`PluginError::InvalidManifest`] for invalid entries.
pub fn load_hyprload_manifest(source_path: &Path) -> Result<HyprloadManifest, PluginError> {
    let path = source_path.join(MANIFEST_FILE_NAME);
    if !path.is_file() {
        return Err(PluginError::ManifestNotFound { path });
    }

    debug!(
        target: MANIFEST_TARGET,
        path = %path.display(),
        "loading build manifest"
    );

    let text = std::fs::read_to_string(&path).map_err(|err| PluginError::ManifestParse {
        path: Some(path.clone()),
        message: err.to_string(),
    })?;
    HyprloadManifest::parse(&text).map_err(|err| match err {
        PluginError::ManifestParse { message, .. } => PluginError::ManifestParse {
            path: Some(path),
            message,
        },
        other => other,
    })
}

/// Loads the manifest entry for `name` from `<source_path>/hyprload.toml`.
///
/// # Errors
///
/// Propagates [`load_hyprload_manifest`] failures and returns
/// [`PluginError::NoManifestFor`] when no entry matches.
pub fn load_plugin_manifest(source_path: &Path, name: &str) -> Result<PluginManifest, PluginError> {
    load_hyprload_manifest(source_path)?
        .into_plugin(name)
        .ok_or_else(|| PluginError::NoManifestFor {
            name: name.to_owned(),
            path: source_path.to_path_buf(),
        })
}

/// `Err(())` when the field is present with a non-string type.
fn optional_string(table: &Table, key: &str) -> Result<Option<String>, ()> {
    match table.get(key) {
        None => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(()),
    }
}

fn string_array(values: &[Value]) -> Option<Vec<String>> {
    values
        .iter()
        .map(|value| value.as_str().map(str::to_owned))
        .collect()
}
