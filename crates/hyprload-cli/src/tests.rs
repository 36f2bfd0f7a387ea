//! Unit tests for the CLI runtime.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use hyprload_config::Config;
use hyprload_plugins::{
    CommandExecutor, CommandOutput, MANIFEST_FILE_NAME, PluginError, ProcessCommand,
    ShellExecutor,
};
use mockall::{Sequence, mock};
use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::*;

mock! {
    Executor {}
    impl CommandExecutor for Executor {
        fn run(&self, command: &ProcessCommand) -> Result<CommandOutput, PluginError>;
    }
}

struct StaticConfigLoader {
    config: Config,
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(self.config.clone())
    }
}

/// A throwaway home for plugins, headers, and the requirement list.
struct Workspace {
    root: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let root = TempDir::new().expect("create temp dir");
        fs::create_dir_all(root.path().join("headers")).expect("create headers dir");
        Self { root }
    }

    fn path(&self) -> &Path {
        self.root.path()
    }

    fn plugins_dir(&self) -> PathBuf {
        self.path().join("plugins")
    }

    fn requirements_path(&self) -> PathBuf {
        self.path().join("hyprload.toml")
    }

    fn loader(&self) -> StaticConfigLoader {
        StaticConfigLoader {
            config: Config {
                plugins_dir: Some(self.plugins_dir()),
                headers_path: Some(self.path().join("headers")),
                requirements_path: Some(self.requirements_path()),
                log_filter: Some(String::from("off")),
                log_format: None,
            },
        }
    }

    fn require(&self, requirements: &str) {
        fs::write(self.requirements_path(), requirements).expect("write requirements");
    }

    /// Creates a local plugin directory whose manifest declares `steps`.
    fn local_plugin(&self, name: &str, steps: &str) -> PathBuf {
        let dir = self.path().join("src").join(name);
        fs::create_dir_all(&dir).expect("create plugin dir");
        fs::write(
            dir.join(MANIFEST_FILE_NAME),
            format!("[{name}]\nbuild.steps = {steps}\n"),
        )
        .expect("write manifest");
        dir
    }

    fn binary(&self, name: &str) -> PathBuf {
        self.plugins_dir().join("bin").join(format!("{name}.so"))
    }

    fn publish(&self, name: &str, content: &str) {
        let binary = self.binary(name);
        fs::create_dir_all(binary.parent().expect("bin dir")).expect("create bin dir");
        fs::write(binary, content).expect("write binary");
    }

    /// Creates a checkout of `foo/bar` whose manifest builds with `make`.
    fn git_checkout(&self) -> PathBuf {
        let checkout = self.plugins_dir().join("src/bar");
        fs::create_dir_all(checkout.join(".git")).expect("fake checkout");
        fs::write(
            checkout.join(MANIFEST_FILE_NAME),
            "[bar]\nbuild.steps = [\"make\"]\n",
        )
        .expect("write manifest");
        checkout
    }
}

#[fixture]
fn workspace() -> Workspace {
    Workspace::new()
}

struct Outcome {
    exit: ExitCode,
    stdout: String,
    stderr: String,
}

fn invoke<E: CommandExecutor>(workspace: &Workspace, args: &[&str], executor: E) -> Outcome {
    let argv = std::iter::once("hyprload")
        .chain(args.iter().copied())
        .map(OsString::from);
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let exit = run_with(argv, &mut stdout, &mut stderr, &workspace.loader(), executor);
    Outcome {
        exit,
        stdout: String::from_utf8(stdout).expect("utf8 stdout"),
        stderr: String::from_utf8(stderr).expect("utf8 stderr"),
    }
}

fn untouched_executor() -> MockExecutor {
    let mut executor = MockExecutor::new();
    executor.expect_run().never();
    executor
}

#[rstest]
fn list_prints_every_requirement(workspace: Workspace) {
    workspace.require(
        r#"plugins = ["foo/bar", { local = "/src/widget", name = "gadget" }]"#,
    );

    let outcome = invoke(&workspace, &["list"], untouched_executor());

    assert_eq!(outcome.exit, ExitCode::SUCCESS);
    let lines: Vec<&str> = outcome.stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("bar\tgit https://github.com/foo/bar.git (main)\t"));
    assert!(lines[0].ends_with("bin/bar.so"));
    assert!(lines[1].starts_with("gadget\tlocal /src/widget\t"));
}

#[rstest]
fn missing_requirement_list_is_empty(workspace: Workspace) {
    let outcome = invoke(&workspace, &["install"], untouched_executor());
    assert_eq!(outcome.exit, ExitCode::SUCCESS);
    assert!(outcome.stdout.is_empty());
}

#[rstest]
fn invalid_requirement_list_fails_before_any_work(workspace: Workspace) {
    workspace.require(r#"plugins = [{ branch = "main" }]"#);
    let outcome = invoke(&workspace, &["install"], untouched_executor());
    assert_eq!(outcome.exit, ExitCode::FAILURE);
    assert!(outcome.stderr.contains("requirement must declare a source"));
}

#[rstest]
fn install_builds_local_plugins(workspace: Workspace) {
    let source = workspace.local_plugin("widget", r#"["printf ok > widget.so"]"#);
    workspace.require(&format!("plugins = [{{ local = \"{}\" }}]", source.display()));

    let outcome = invoke(&workspace, &["install"], ShellExecutor);

    assert_eq!(outcome.exit, ExitCode::SUCCESS, "stderr: {}", outcome.stderr);
    assert!(outcome.stdout.starts_with("widget: published "));
    assert_eq!(
        fs::read_to_string(workspace.binary("widget")).expect("read binary"),
        "ok"
    );
}

#[rstest]
fn one_failure_does_not_stop_the_run(workspace: Workspace) {
    let broken = workspace.local_plugin("broken", r#"["echo 'undefined reference' >&2 && false"]"#);
    let widget = workspace.local_plugin("widget", r#"["printf ok > widget.so"]"#);
    workspace.require(&format!(
        "plugins = [{{ local = \"{}\" }}, {{ local = \"{}\" }}]",
        broken.display(),
        widget.display()
    ));

    let outcome = invoke(&workspace, &["install"], ShellExecutor);

    assert_eq!(outcome.exit, ExitCode::FAILURE);
    assert!(outcome.stderr.contains("broken: "));
    assert!(outcome.stderr.contains("undefined reference"));
    assert!(outcome.stdout.contains("widget: published"));
    assert!(workspace.binary("widget").exists());
    assert!(!workspace.binary("broken").exists());
}

#[rstest]
fn install_clones_then_builds_git_plugins(workspace: Workspace) {
    workspace.require(r#"plugins = ["foo/bar"]"#);
    let mut sequence = Sequence::new();
    let mut executor = MockExecutor::new();
    executor
        .expect_run()
        .once()
        .in_sequence(&mut sequence)
        .withf(|command| command.to_string().starts_with("git clone"))
        .returning(|command| {
            let checkout = PathBuf::from(&command.arguments()[2]);
            fs::create_dir_all(checkout.join(".git")).expect("create checkout");
            fs::write(
                checkout.join(MANIFEST_FILE_NAME),
                "[bar]\nbuild.steps = [\"make\"]\n",
            )
            .expect("write manifest");
            Ok(CommandOutput::new(0, ""))
        });
    executor
        .expect_run()
        .once()
        .in_sequence(&mut sequence)
        .withf(|command| command.to_string() == "sh -c make")
        .returning(|command| {
            let dir = command.working_dir().expect("build runs in checkout");
            fs::write(dir.join("bar.so"), "binary").expect("write artifact");
            Ok(CommandOutput::new(0, "built"))
        });

    let outcome = invoke(&workspace, &["install"], executor);

    assert_eq!(outcome.exit, ExitCode::SUCCESS, "stderr: {}", outcome.stderr);
    assert!(outcome.stdout.starts_with("bar: published"));
    assert!(workspace.binary("bar").exists());
}

#[rstest]
fn update_skips_published_plugins_with_nothing_upstream(workspace: Workspace) {
    workspace.require(r#"plugins = ["foo/bar"]"#);
    workspace.git_checkout();
    workspace.publish("bar", "current");

    let mut executor = MockExecutor::new();
    executor
        .expect_run()
        .withf(|command| command.to_string().ends_with("remote update"))
        .returning(|_| Ok(CommandOutput::new(0, "")));
    executor
        .expect_run()
        .withf(|command| command.to_string().contains("rev-list"))
        .returning(|_| Ok(CommandOutput::new(0, "0\n")));

    let outcome = invoke(&workspace, &["update"], executor);

    assert_eq!(outcome.exit, ExitCode::SUCCESS);
    assert_eq!(outcome.stdout, "bar: up to date\n");
    assert_eq!(
        fs::read_to_string(workspace.binary("bar")).expect("read binary"),
        "current"
    );
}

#[rstest]
fn update_builds_fetched_source_without_a_binary(workspace: Workspace) {
    workspace.require(r#"plugins = ["foo/bar"]"#);
    workspace.git_checkout();

    let mut executor = MockExecutor::new();
    executor
        .expect_run()
        .withf(|command| command.to_string().contains("rev-list"))
        .never();
    executor
        .expect_run()
        .withf(|command| command.to_string().ends_with(" pull"))
        .times(1)
        .returning(|_| Ok(CommandOutput::new(0, "Already up to date.")));
    executor
        .expect_run()
        .withf(|command| command.to_string() == "sh -c make")
        .times(1)
        .returning(|command| {
            let dir = command.working_dir().expect("build runs in checkout");
            fs::write(dir.join("bar.so"), "fresh").expect("write artifact");
            Ok(CommandOutput::new(0, ""))
        });

    let outcome = invoke(&workspace, &["update"], executor);

    assert_eq!(outcome.exit, ExitCode::SUCCESS, "stderr: {}", outcome.stderr);
    assert!(outcome.stdout.starts_with("bar: published"));
    assert_eq!(
        fs::read_to_string(workspace.binary("bar")).expect("read binary"),
        "fresh"
    );
}

#[rstest]
fn install_builds_fetched_source_without_cloning(workspace: Workspace) {
    workspace.require(r#"plugins = ["foo/bar"]"#);
    workspace.git_checkout();

    let mut executor = MockExecutor::new();
    executor
        .expect_run()
        .withf(|command| command.to_string().starts_with("git clone"))
        .never();
    executor
        .expect_run()
        .withf(|command| command.to_string() == "sh -c make")
        .times(1)
        .returning(|command| {
            let dir = command.working_dir().expect("build runs in checkout");
            fs::write(dir.join("bar.so"), "built").expect("write artifact");
            Ok(CommandOutput::new(0, ""))
        });

    let outcome = invoke(&workspace, &["install"], executor);

    assert_eq!(outcome.exit, ExitCode::SUCCESS, "stderr: {}", outcome.stderr);
    assert!(workspace.binary("bar").is_file());
}

#[rstest]
fn update_pulls_when_upstream_moved(workspace: Workspace) {
    workspace.require(r#"plugins = ["foo/bar"]"#);
    workspace.git_checkout();
    workspace.publish("bar", "old");

    let mut executor = MockExecutor::new();
    executor
        .expect_run()
        .withf(|command| command.to_string().contains("rev-list"))
        .returning(|_| Ok(CommandOutput::new(0, "2\n")));
    executor
        .expect_run()
        .withf(|command| command.to_string().ends_with(" pull"))
        .times(1)
        .returning(|_| Ok(CommandOutput::new(0, "Fast-forward")));
    executor
        .expect_run()
        .withf(|command| command.to_string() == "sh -c make")
        .returning(|command| {
            let dir = command.working_dir().expect("build runs in checkout");
            fs::write(dir.join("bar.so"), "new").expect("write artifact");
            Ok(CommandOutput::new(0, ""))
        });
    executor
        .expect_run()
        .returning(|_| Ok(CommandOutput::new(0, "")));

    let outcome = invoke(&workspace, &["update"], executor);

    assert_eq!(outcome.exit, ExitCode::SUCCESS, "stderr: {}", outcome.stderr);
    assert!(outcome.stdout.starts_with("bar: published"));
    assert_eq!(
        fs::read_to_string(workspace.binary("bar")).expect("read binary"),
        "new"
    );
}

#[rstest]
fn build_rebuilds_one_plugin(workspace: Workspace) {
    let widget = workspace.local_plugin("widget", r#"["printf v2 > widget.so"]"#);
    let other = workspace.local_plugin("other", r#"["false"]"#);
    workspace.require(&format!(
        "plugins = [{{ local = \"{}\" }}, {{ local = \"{}\" }}]",
        widget.display(),
        other.display()
    ));

    let outcome = invoke(&workspace, &["build", "widget"], ShellExecutor);

    assert_eq!(outcome.exit, ExitCode::SUCCESS, "stderr: {}", outcome.stderr);
    assert!(workspace.binary("widget").exists());
    assert!(outcome.stderr.is_empty());
}

#[rstest]
#[case::unknown(&["build", "nope"], "no plugin named 'nope' is required")]
#[case::not_installed(&["build", "bar"], "source for 'bar' is not installed")]
fn build_requires_an_installed_requirement(
    workspace: Workspace,
    #[case] args: &[&str],
    #[case] message: &str,
) {
    workspace.require(r#"plugins = ["foo/bar"]"#);
    let outcome = invoke(&workspace, args, untouched_executor());
    assert_eq!(outcome.exit, ExitCode::FAILURE);
    assert!(outcome.stderr.contains(message), "stderr: {}", outcome.stderr);
}

#[rstest]
fn build_of_a_missing_local_directory_reports_the_path(workspace: Workspace) {
    let missing = workspace.path().join("src/gone");
    workspace.require(&format!("plugins = [{{ local = \"{}\" }}]", missing.display()));

    let outcome = invoke(&workspace, &["build", "gone"], untouched_executor());

    assert_eq!(outcome.exit, ExitCode::FAILURE);
    assert!(outcome.stderr.contains("source for gone does not exist"), "stderr: {}", outcome.stderr);
    assert!(!outcome.stderr.contains("hyprload install"));
}

#[rstest]
fn unknown_subcommand_is_a_usage_error(workspace: Workspace) {
    let outcome = invoke(&workspace, &["frobnicate"], untouched_executor());
    assert_eq!(outcome.exit, ExitCode::FAILURE);
    assert!(outcome.stderr.contains("frobnicate"));
}

#[rstest]
fn help_goes_to_stdout(workspace: Workspace) {
    let outcome = invoke(&workspace, &["--help"], untouched_executor());
    assert_eq!(outcome.exit, ExitCode::SUCCESS);
    assert!(outcome.stdout.contains("install"));
    assert!(outcome.stdout.contains("update"));
}
