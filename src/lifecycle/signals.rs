//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for SIGINT/SIGTERM in the running daemon
//! - Deliver SIGTERM to a daemon recorded in a pid file (`stop`)

use std::io;

use tokio::signal;

/// Resolve once a termination signal arrives; returns its name.
#[cfg(unix)]
pub async fn shutdown_signal() -> io::Result<&'static str> {
    let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())?;

    tokio::select! {
        result = signal::ctrl_c() => {
            result?;
            Ok("SIGINT")
        }
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
pub async fn shutdown_signal() -> io::Result<&'static str> {
    signal::ctrl_c().await?;
    Ok("ctrl-c")
}

/// Ask process `pid` to terminate.
#[cfg(unix)]
pub fn send_terminate(pid: i32) -> io::Result<()> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    kill(Pid::from_raw(pid), Signal::SIGTERM).map_err(io::Error::from)
}

#[cfg(not(unix))]
pub fn send_terminate(_pid: i32) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "stopping a daemon is only supported on unix",
    ))
}
