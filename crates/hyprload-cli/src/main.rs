//! Entry point for the `hyprload` plugin manager.
//!
//! The binary delegates to [`hyprload_cli::run`], which loads configuration,
//! reads the requirement list, and drives each plugin through install,
//! update, or build.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    hyprload_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
