//! Integration tests for the `hyprload` binary entry point.
//!
//! Verifies that configuration flags reach the loader, that the requirement
//! list is read from the configured path, and that usage errors fail.

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;
use tempfile::TempDir;

#[test]
fn list_reads_configured_requirements() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let requirements = dir.path().join("hyprload.toml");
    fs::write(
        &requirements,
        "plugins = [\"hyprwm/hyprland-plugins\", { local = \"/src/widget\" }]\n",
    )?;

    let mut command = cargo_bin_cmd!("hyprload");
    command
        .arg("--plugins-dir")
        .arg(dir.path().join("plugins"))
        .arg("--requirements-path")
        .arg(&requirements)
        .arg("--log-filter=off")
        .arg("list");
    command
        .assert()
        .success()
        .stdout(contains(
            "hyprland-plugins\tgit https://github.com/hyprwm/hyprland-plugins.git (main)",
        ))
        .stdout(contains("widget\tlocal /src/widget"));
    Ok(())
}

#[test]
fn install_without_headers_reports_setup_hint() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let source = dir.path().join("widget");
    fs::create_dir_all(&source)?;
    fs::write(
        source.join("hyprload.toml"),
        "[widget]\nbuild.steps = [\"touch widget.so\"]\n",
    )?;
    let requirements = dir.path().join("hyprload.toml");
    fs::write(
        &requirements,
        format!("plugins = [{{ local = \"{}\" }}]\n", source.display()),
    )?;

    let mut command = cargo_bin_cmd!("hyprload");
    command
        .arg("--plugins-dir")
        .arg(dir.path().join("plugins"))
        .arg("--headers-path")
        .arg(dir.path().join("missing-headers"))
        .arg("--requirements-path")
        .arg(&requirements)
        .arg("--log-filter=off")
        .arg("install");
    command
        .assert()
        .failure()
        .stderr(contains("widget: "))
        .stderr(contains("hyprload#Setup"));
    Ok(())
}

#[test]
fn missing_subcommand_exits_with_failure() {
    let mut command = cargo_bin_cmd!("hyprload");
    command.assert().failure().stderr(contains("Usage"));
}
