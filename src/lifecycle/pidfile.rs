//! PID file handling.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PidFileError {
    #[error("failed to access pid file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("pid file {path} does not contain a process id: {content:?}")]
    Invalid { path: String, content: String },

    #[error("process {pid} recorded in {path} is still running")]
    AlreadyRunning { pid: i32, path: String },
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> PidFileError + '_ {
    move |source| PidFileError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// A PID file owned by this process. Removed on drop.
#[derive(Debug)]
pub struct PidFile {
    path: PathBuf,
    pid: i32,
}

impl PidFile {
    /// Record the current process.
    pub fn create(path: &Path) -> Result<Self, PidFileError> {
        let pid = i32::try_from(std::process::id()).unwrap_or(i32::MAX);
        Self::create_with_pid(path, pid)
    }

    /// Record `pid`, replacing a stale file but never a live one.
    pub fn create_with_pid(path: &Path, pid: i32) -> Result<Self, PidFileError> {
        if let Some(existing) = check_not_running(path, pid)? {
            tracing::warn!(path = %path.display(), stale_pid = existing, "Replacing stale pid file");
        }

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(io_error(path))?;
        }
        fs::write(path, format!("{}\n", pid)).map_err(io_error(path))?;

        tracing::debug!(path = %path.display(), pid, "Pid file written");
        Ok(Self {
            path: path.to_path_buf(),
            pid,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn pid(&self) -> i32 {
        self.pid
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        // leave the file alone if another process has taken it over
        if let Ok(Some(pid)) = read_pid(&self.path) {
            if pid == self.pid {
                let _ = fs::remove_file(&self.path);
            }
        }
    }
}

/// Read the recorded process id; `None` when the file does not exist.
pub fn read_pid(path: &Path) -> Result<Option<i32>, PidFileError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_error(path)(e)),
    };

    match content.trim().parse::<i32>() {
        Ok(pid) if pid > 0 => Ok(Some(pid)),
        _ => Err(PidFileError::Invalid {
            path: path.display().to_string(),
            content,
        }),
    }
}

/// Fail when `path` records a live process other than `own_pid`.
///
/// Returns the stale pid, if any, that a new file would replace.
pub fn check_not_running(path: &Path, own_pid: i32) -> Result<Option<i32>, PidFileError> {
    match read_pid(path)? {
        Some(existing) if existing != own_pid && process_alive(existing) => {
            Err(PidFileError::AlreadyRunning {
                pid: existing,
                path: path.display().to_string(),
            })
        }
        other => Ok(other),
    }
}

/// Whether a process with `pid` exists.
#[cfg(unix)]
pub fn process_alive(pid: i32) -> bool {
    use nix::errno::Errno;
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    match kill(Pid::from_raw(pid), None) {
        Ok(()) => true,
        Err(Errno::EPERM) => true,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
pub fn process_alive(_pid: i32) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_and_removes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run").join("stagehand.pid");

        let pid_file = PidFile::create(&path).unwrap();
        assert_eq!(read_pid(&path).unwrap(), Some(pid_file.pid()));

        drop(pid_file);
        assert!(!path.exists());
        assert_eq!(read_pid(&path).unwrap(), None);
    }

    #[test]
    fn replaces_stale_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stagehand.pid");
        fs::write(&path, format!("{}\n", i32::MAX)).unwrap();

        let pid_file = PidFile::create_with_pid(&path, 4242).unwrap();
        assert_eq!(read_pid(&path).unwrap(), Some(4242));
        assert_eq!(pid_file.path(), path.as_path());
    }

    #[cfg(unix)]
    #[test]
    fn refuses_live_process() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stagehand.pid");
        let ours = PidFile::create(&path).unwrap();

        let err = PidFile::create_with_pid(&path, ours.pid() + 1).unwrap_err();
        assert!(matches!(err, PidFileError::AlreadyRunning { pid, .. } if pid == ours.pid()));
        assert!(path.exists());
    }

    #[test]
    fn rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stagehand.pid");
        fs::write(&path, "not-a-pid").unwrap();
        assert!(matches!(read_pid(&path), Err(PidFileError::Invalid { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn check_reports_live_owner() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stagehand.pid");
        assert_eq!(check_not_running(&path, 1).unwrap(), None);

        let ours = PidFile::create(&path).unwrap();
        let err = check_not_running(&path, ours.pid() + 1).unwrap_err();
        assert!(matches!(err, PidFileError::AlreadyRunning { pid, .. } if pid == ours.pid()));
        assert!(err.to_string().contains("still running"));

        // the recorded process checking its own file is not a conflict
        assert_eq!(check_not_running(&path, ours.pid()).unwrap(), Some(ours.pid()));
    }

    #[test]
    fn check_passes_stale_pid_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stagehand.pid");
        fs::write(&path, format!("{}\n", i32::MAX)).unwrap();

        assert_eq!(check_not_running(&path, 4242).unwrap(), Some(i32::MAX));
    }
}
