//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Defaults → file → env → flags → Validate → Settings
//!
//! Background mode (daemonize.rs):
//!     daemon.enable → re-spawn detached child → parent exits
//!
//! Running:
//!     pidfile.rs writes the pid → server runs until shutdown
//!
//! Signals (signals.rs) / Shutdown (shutdown.rs):
//!     SIGTERM/SIGINT → broadcast shutdown → stop accepting → remove pid file
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then logging, then pid file, then listener
//! - `stop` signals the pid recorded on disk; it never guesses

pub mod daemonize;
pub mod pidfile;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use pidfile::{PidFile, PidFileError};
pub use shutdown::Shutdown;
pub use startup::{prepare, utf8_env, StartupError, StartupOptions};
