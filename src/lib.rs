//! Stagehand Daemon Library
//!
//! Layered startup configuration (defaults, file, environment, flags)
//! validated as a whole before the daemon detaches, writes its pid file and
//! opens its status port.

pub mod cli;
pub mod config;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::{validate_config, ConfigStore, Settings};
pub use lifecycle::Shutdown;
