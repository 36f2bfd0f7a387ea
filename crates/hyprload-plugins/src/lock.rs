//! Per-plugin advisory locks.
//!
//! Two concurrent installs of the same plugin would race on its source tree
//! and on the published binary. A [`PluginLock`] serialises them: the lock
//! file is created exclusively, records the holder's pid, and is removed
//! when the guard is dropped. A holder that was killed never drops its
//! guard, so a lock whose pid no longer names a live process is reclaimed.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::Pid;
use tracing::{debug, warn};

use crate::error::PluginError;
use crate::layout::PluginLayout;

const LOCK_TARGET: &str = "hyprload_plugins::lock";

/// How long a lock file may stay empty while its creator writes the pid.
const PID_WRITE_GRACE: Duration = Duration::from_secs(5);

/// Guard holding `<plugins-dir>/locks/<name>.lock`.
#[derive(Debug)]
pub struct PluginLock {
    path: PathBuf,
    _file: File,
}

impl PluginLock {
    /// Acquires the lock for plugin `name`, reclaiming it first if the
    /// recorded holder is no longer running.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Locked`] if a live process holds the lock, or
    /// [`PluginError::Io`] if the lock file cannot be created or a stale
    /// one cannot be removed.
    pub fn acquire(layout: &PluginLayout, name: &str) -> Result<Self, PluginError> {
        let directory = layout.locks_dir();
        fs::create_dir_all(&directory).map_err(|err| PluginError::io(&directory, err))?;

        let path = layout.lock_path(name);
        match create_lock(&path) {
            Ok(file) => Ok(Self::held(name, path, file)),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                if !holder_is_gone(&path, name) {
                    return Err(locked(name, path));
                }
                remove_stale(&path)?;
                match create_lock(&path) {
                    Ok(file) => Ok(Self::held(name, path, file)),
                    Err(retry) if retry.kind() == io::ErrorKind::AlreadyExists => {
                        Err(locked(name, path))
                    }
                    Err(retry) => Err(PluginError::io(path, retry)),
                }
            }
            Err(err) => Err(PluginError::io(path, err)),
        }
    }

    /// Returns the lock file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn held(name: &str, path: PathBuf, file: File) -> Self {
        debug!(
            target: LOCK_TARGET,
            plugin = name,
            file = %path.display(),
            "acquired plugin lock"
        );
        Self { path, _file: file }
    }
}

impl Drop for PluginLock {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Err(error) if error.kind() != io::ErrorKind::NotFound => {
                warn!(
                    target: LOCK_TARGET,
                    file = %self.path.display(),
                    error = %error,
                    "failed to remove lock file"
                );
            }
            _ => {}
        }
    }
}

fn locked(name: &str, path: PathBuf) -> PluginError {
    PluginError::Locked {
        name: name.to_owned(),
        path,
    }
}

/// Creates the lock file exclusively and records the current pid in it.
fn create_lock(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    if let Err(error) = writeln!(file, "{}", process::id()) {
        drop(fs::remove_file(path));
        return Err(error);
    }
    Ok(file)
}

/// Decides whether the lock at `path` was left behind by a dead holder.
fn holder_is_gone(path: &Path, name: &str) -> bool {
    match read_pid(path) {
        Some(pid) if process_alive(pid) => false,
        Some(pid) => {
            warn!(
                target: LOCK_TARGET,
                plugin = name,
                pid,
                "lock holder is not running; reclaiming stale lock"
            );
            true
        }
        // A fresh lock without a pid is still being written by its creator.
        None => !recently_modified(path),
    }
}

fn read_pid(path: &Path) -> Option<u32> {
    let content = fs::read_to_string(path).ok()?;
    content.trim().parse::<u32>().ok()
}

fn recently_modified(path: &Path) -> bool {
    fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .ok()
        .and_then(|modified| modified.elapsed().ok())
        .is_some_and(|age| age < PID_WRITE_GRACE)
}

fn process_alive(pid: u32) -> bool {
    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    if raw == 0 {
        return false;
    }
    match kill(Pid::from_raw(raw), None) {
        Ok(()) | Err(Errno::EPERM) => true,
        Err(Errno::ESRCH) => false,
        Err(errno) => {
            warn!(
                target: LOCK_TARGET,
                pid,
                error = %errno,
                "could not probe lock holder; assuming it is alive"
            );
            true
        }
    }
}

fn remove_stale(path: &Path) -> Result<(), PluginError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(error) => Err(PluginError::io(path, error)),
    }
}
