//! Shared test doubles and crate-level end-to-end tests.

use std::fs;
use std::path::Path;

use mockall::mock;
use tempfile::TempDir;

use crate::environment::{PluginEnvironment, Toolchain};
use crate::error::PluginError;
use crate::layout::PluginLayout;
use crate::manifest::MANIFEST_FILE_NAME;
use crate::process::{CommandExecutor, CommandOutput, ProcessCommand};


mock! {
    pub Executor {}
    impl CommandExecutor for Executor {
        fn run(&self, command: &ProcessCommand) -> Result<CommandOutput, PluginError>;
    }
}

/// Temporary plugins directory plus a header directory that exists.
pub(crate) struct Sandbox {
    pub(crate) root: TempDir,
}

impl Sandbox {
    pub(crate) fn new() -> Self {
        let root = TempDir::new().expect("create temp dir");
        fs::create_dir_all(root.path().join("headers")).expect("create headers dir");
        Self { root }
    }

    pub(crate) fn layout(&self) -> PluginLayout {
        PluginLayout::new(self.root.path().join("plugins"))
    }

    pub(crate) fn toolchain(&self) -> Toolchain {
        Toolchain::new(Some(self.headers()))
    }

    pub(crate) fn headers(&self) -> std::path::PathBuf {
        self.root.path().join("headers")
    }

    pub(crate) fn environment<E>(&self, executor: E) -> PluginEnvironment<E> {
        PluginEnvironment::new(executor, self.layout(), self.toolchain())
    }
}

/// Writes `hyprload.toml` with `contents` into `dir`, creating it.
pub(crate) fn write_manifest(dir: &Path, contents: &str) {
    fs::create_dir_all(dir).expect("create source dir");
    fs::write(dir.join(MANIFEST_FILE_NAME), contents).expect("write manifest");
}

/// Returns the rendered form of `command` for assertions.
pub(crate) fn rendered(command: &ProcessCommand) -> String {
    command.to_string()
}
