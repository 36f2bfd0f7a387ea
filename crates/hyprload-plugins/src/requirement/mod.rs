//! User-declared plugin requirements.
//!
//! A requirement names a plugin, owns the [`PluginSource`] it comes from,
//! and fixes where its binary is published. Requirements are rebuilt from
//! configuration on every run and never persisted.
//!
//! The requirement list is a TOML document with a `plugins` array. Each
//! entry is either a table:
//!
//! ```toml
//! plugins = [
//!     { git = "hyprwm/hyprland-plugins", branch = "main", name = "hyprbars" },
//!     { local = "/home/me/src/my-plugin" },
//! ]
//! ```
//!
//! or a bare string, which is shorthand for `{ git = "<string>" }`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use toml::{Table, Value};

use crate::environment::PluginEnvironment;
use crate::error::PluginError;
use crate::layout::PluginLayout;
use crate::lock::PluginLock;
use crate::manifest::PluginManifest;
use crate::process::CommandExecutor;
use crate::source::{
    DEFAULT_BRANCH, GitSource, InstallOutcome, LocalSource, PluginSource, repository_name,
};

/// Key of the requirement array in the requirement list.
pub const PLUGINS_KEY: &str = "plugins";

/// One plugin the user wants installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginRequirement {
    name: String,
    source: PluginSource,
    binary_path: PathBuf,
}

impl PluginRequirement {
    /// Creates a requirement for `source` published as `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, source: PluginSource, layout: &PluginLayout) -> Self {
        let resolved: String = name.into();
        let binary_path = layout.binary_path(&resolved);
        Self {
            name: resolved,
            source,
            binary_path,
        }
    }

    /// Parses a requirement table.
    ///
    /// `git` takes priority over `local`; `branch` defaults to `main`; an
    /// explicit `name` wins over the name derived from the source.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::InvalidRequirement`] when neither source is
    /// declared, a field has the wrong type, or no name can be derived.
    ///
    /// # Example
    ///
    /// ```
    /// use hyprload_plugins::{PluginLayout, PluginRequirement};
    /// use std::path::Path;
    ///
    /// let layout = PluginLayout::new("/plugins");
    /// let entry: toml::Table = toml::from_str(r#"git = "foo/bar""#).unwrap();
    /// let requirement = PluginRequirement::from_table(&entry, &layout).unwrap();
    ///
    /// assert_eq!(requirement.name(), "bar");
    /// assert_eq!(requirement.binary_path(), Path::new("/plugins/bin/bar.so"));
    /// ```
    pub fn from_table(entry: &Table, layout: &PluginLayout) -> Result<Self, PluginError> {
        let explicit_name = string_field(entry, "name")?;

        let (source, derived_name) = if let Some(url) = string_field(entry, "git")? {
            let branch = string_field(entry, "branch")?.unwrap_or(DEFAULT_BRANCH);
            let git = GitSource::new(url, branch, layout)?;
            (PluginSource::Git(git), repository_name(url).map(str::to_owned))
        } else if let Some(path) = string_field(entry, "local")? {
            let derived = Path::new(path)
                .file_name()
                .and_then(|segment| segment.to_str())
                .map(str::to_owned);
            (PluginSource::Local(LocalSource::new(path)), derived)
        } else {
            return Err(invalid("requirement must declare a source"));
        };

        let name = match explicit_name {
            Some(name) => validate_name(name)?.to_owned(),
            None => derived_name.ok_or_else(|| {
                invalid(&format!("cannot derive a plugin name from {source}"))
            })?,
        };
        Ok(Self::new(name, source, layout))
    }

    /// Parses one entry of the `plugins` array: a table or a Git shorthand
    /// string.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::InvalidRequirement`] for any other value type
    /// and propagates [`PluginRequirement::from_table`] errors.
    pub fn from_value(entry: &Value, layout: &PluginLayout) -> Result<Self, PluginError> {
        match entry {
            Value::Table(table) => Self::from_table(table, layout),
            Value::String(url) => {
                let mut table = Table::new();
                table.insert(String::from("git"), Value::String(url.clone()));
                Self::from_table(&table, layout)
            }
            other => Err(invalid(&format!(
                "entries must be tables or strings, found {}",
                other.type_str()
            ))),
        }
    }

    /// Returns the resolved plugin name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the plugin's source.
    #[must_use]
    pub const fn source(&self) -> &PluginSource {
        &self.source
    }

    /// Returns `<plugins-dir>/bin/<name>.so`.
    #[must_use]
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    /// Runs [`PluginSource::install`] while holding the plugin's lock.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Locked`] if another operation holds the lock,
    /// otherwise propagates the source's error.
    pub fn install<E: CommandExecutor>(
        &self,
        env: &PluginEnvironment<E>,
    ) -> Result<InstallOutcome, PluginError> {
        let _lock = PluginLock::acquire(env.layout(), &self.name)?;
        self.source.install(&self.name, env)
    }

    /// Runs [`PluginSource::update`] while holding the plugin's lock.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Locked`] if another operation holds the lock,
    /// otherwise propagates the source's error.
    pub fn update<E: CommandExecutor>(
        &self,
        env: &PluginEnvironment<E>,
    ) -> Result<InstallOutcome, PluginError> {
        let _lock = PluginLock::acquire(env.layout(), &self.name)?;
        self.source.update(&self.name, env)
    }

    /// Runs [`PluginSource::build`] while holding the plugin's lock.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Locked`] if another operation holds the lock,
    /// otherwise propagates the build error.
    pub fn build<E: CommandExecutor>(
        &self,
        env: &PluginEnvironment<E>,
    ) -> Result<PluginManifest, PluginError> {
        let _lock = PluginLock::acquire(env.layout(), &self.name)?;
        self.source.build(&self.name, env)
    }
}

/// Every requirement declared by the user, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementList {
    requirements: Vec<PluginRequirement>,
}

impl RequirementList {
    /// Parses requirement list text.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::ManifestParse`] for malformed TOML, and the
    /// errors of [`RequirementList::from_table`].
    pub fn parse(text: &str, layout: &PluginLayout) -> Result<Self, PluginError> {
        let table = text
            .parse::<Table>()
            .map_err(|err| PluginError::ManifestParse {
                path: None,
                message: err.to_string(),
            })?;
        Self::from_table(&table, layout)
    }

    /// Builds the list from a parsed document. A missing `plugins` key
    /// yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::InvalidRequirement`] if `plugins` is not an
    /// array or an entry is invalid, and
    /// [`PluginError::DuplicateRequirement`] if two entries resolve to the
    /// same name.
    pub fn from_table(table: &Table, layout: &PluginLayout) -> Result<Self, PluginError> {
        let entries = match table.get(PLUGINS_KEY) {
            None => return Ok(Self::default()),
            Some(Value::Array(entries)) => entries,
            Some(_) => return Err(invalid("`plugins` must be an array")),
        };

        let mut seen = HashSet::new();
        let mut requirements = Vec::with_capacity(entries.len());
        for entry in entries {
            let requirement = PluginRequirement::from_value(entry, layout)?;
            if !seen.insert(requirement.name.clone()) {
                return Err(PluginError::DuplicateRequirement {
                    name: requirement.name,
                });
            }
            requirements.push(requirement);
        }
        Ok(Self { requirements })
    }

    /// Reads and parses the requirement list at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Io`] if the file cannot be read, otherwise the
    /// errors of [`RequirementList::parse`] with the path attached to parse
    /// failures.
    pub fn load(path: &Path, layout: &PluginLayout) -> Result<Self, PluginError> {
        let text = std::fs::read_to_string(path).map_err(|err| PluginError::io(path, err))?;
        Self::parse(&text, layout).map_err(|err| match err {
            PluginError::ManifestParse { message, .. } => PluginError::ManifestParse {
                path: Some(path.to_path_buf()),
                message,
            },
            other => other,
        })
    }

    /// Returns the requirements in file order.
    #[must_use]
    pub fn requirements(&self) -> &[PluginRequirement] {
        &self.requirements
    }

    /// Returns the requirement named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PluginRequirement> {
        self.requirements
            .iter()
            .find(|requirement| requirement.name() == name)
    }

    /// Returns the number of requirements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    /// Returns `true` when no plugins are required.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }
}

impl<'a> IntoIterator for &'a RequirementList {
    type Item = &'a PluginRequirement;
    type IntoIter = std::slice::Iter<'a, PluginRequirement>;

    fn into_iter(self) -> Self::IntoIter {
        self.requirements.iter()
    }
}

fn invalid(message: &str) -> PluginError {
    PluginError::InvalidRequirement {
        message: message.to_owned(),
    }
}

fn string_field<'a>(entry: &'a Table, key: &str) -> Result<Option<&'a str>, PluginError> {
    match entry.get(key) {
        None => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.as_str())),
        Some(_) => Err(invalid(&format!("`{key}` must be a string"))),
    }
}

/// Names become file names under `bin/` and `locks/`.
fn validate_name(name: &str) -> Result<&str, PluginError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(invalid(&format!("'{name}' is not a valid plugin name")));
    }
    Ok(name)
}
