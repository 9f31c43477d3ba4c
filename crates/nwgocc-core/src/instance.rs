//! Single-instance guard based on an advisory file lock.
//!
//! Starting a second instance terminates the first one, so a single key
//! binding toggles the panel.

use std::env;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

const LOCK_FILE: &str = "nwgocc.lock";

#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("instance lock failed: {0}")]
    Io(#[from] io::Error),
    #[error("another instance is running (pid {})", display_pid(*pid))]
    AlreadyRunning { pid: Option<i32> },
}

/// Held for the lifetime of the process; releases the lock on drop.
///
/// The lock file is never unlinked: a waiting instance may already hold the
/// old inode open, and a fresh file would let two instances lock at once.
#[derive(Debug)]
pub struct InstanceLock {
    file: File,
}

impl InstanceLock {
    /// Take the lock, sending SIGTERM to the running instance if there is one.
    pub fn acquire(path: &Path) -> Result<Self, InstanceError> {
        Self::acquire_with(path, terminate)
    }

    /// Take the lock, handing the pid of a running instance to `on_running`.
    pub fn acquire_with(path: &Path, on_running: impl FnOnce(i32)) -> Result<Self, InstanceError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        // SAFETY: the descriptor belongs to `file`, which stays open for the call.
        let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
        if rc != 0 {
            let err = io::Error::last_os_error();
            if err.raw_os_error() != Some(libc::EWOULDBLOCK) {
                return Err(InstanceError::Io(err));
            }
            let pid = read_pid(&mut file);
            if let Some(pid) = pid {
                on_running(pid);
            }
            return Err(InstanceError::AlreadyRunning { pid });
        }

        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        write!(file, "{}", std::process::id())?;
        file.flush()?;
        debug!(path = %path.display(), "instance lock acquired");
        Ok(Self { file })
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        // SAFETY: the descriptor is still owned by `self.file`.
        unsafe {
            libc::flock(self.file.as_raw_fd(), libc::LOCK_UN);
        }
    }
}

/// `$XDG_RUNTIME_DIR/nwgocc.lock`, or the same name in the temp directory.
pub fn default_lock_path() -> PathBuf {
    env::var_os("XDG_RUNTIME_DIR")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(env::temp_dir)
        .join(LOCK_FILE)
}

fn display_pid(pid: Option<i32>) -> String {
    pid.map_or_else(|| "unknown".to_string(), |pid| pid.to_string())
}

fn read_pid(file: &mut File) -> Option<i32> {
    let mut contents = String::new();
    file.seek(SeekFrom::Start(0)).ok()?;
    file.read_to_string(&mut contents).ok()?;
    contents.trim().parse::<i32>().ok().filter(|pid| *pid > 0)
}

fn terminate(pid: i32) {
    if pid as u32 == std::process::id() {
        return;
    }
    // SAFETY: plain syscall with a pid read from our own lock file.
    let rc = unsafe { libc::kill(pid, libc::SIGTERM) };
    if rc != 0 {
        warn!(pid, err = %io::Error::last_os_error(), "failed to signal running instance");
    }
}
