//! Background mode.
//!
//! The parent re-runs the current executable with the same arguments and a
//! marker variable, then exits; the child starts its own session.

use std::ffi::OsString;
use std::io;
use std::process::{Command, Stdio};

/// Set in the environment of the background child.
pub const DAEMON_CHILD_ENV: &str = "STAGEHAND_DAEMON_CHILD";

pub fn is_daemon_child() -> bool {
    std::env::var_os(DAEMON_CHILD_ENV).is_some()
}

/// Spawn a detached copy of this process with `args`; returns its pid.
pub fn spawn_background(args: &[OsString]) -> io::Result<u32> {
    let exe = std::env::current_exe()?;

    let child = Command::new(&exe)
        .args(args)
        .env(DAEMON_CHILD_ENV, "1")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    tracing::debug!(exe = %exe.display(), pid = child.id(), "Background process spawned");
    Ok(child.id())
}

/// Leave the controlling terminal's session.
#[cfg(unix)]
pub fn detach_session() -> io::Result<()> {
    nix::unistd::setsid().map(|_| ()).map_err(io::Error::from)
}

#[cfg(not(unix))]
pub fn detach_session() -> io::Result<()> {
    Ok(())
}
