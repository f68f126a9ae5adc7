//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber from `log.*` settings
//! - Route daemon output to the rotating log file
//! - Provide a stderr subscriber for short-lived commands
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the configured level when set
//! - JSON format for machine parsing, plain text otherwise

use std::io;
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, LogSettings};
use crate::observability::rotation::{RotatingFile, RotationPolicy};

/// Error type for logging setup.
#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("failed to open log file: {0}")]
    Io(#[from] io::Error),

    #[error("failed to install subscriber: {0}")]
    Init(#[from] TryInitError),
}

fn filter_for(directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive))
}

/// Install the global subscriber writing to the configured log file.
pub fn init_logging(settings: &LogSettings) -> Result<(), LoggingError> {
    let file = RotatingFile::open(&settings.file_name, RotationPolicy::from(settings))?;
    let writer = Mutex::new(file);
    let registry = tracing_subscriber::registry().with(filter_for(settings.filter_directive()));

    match settings.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_ansi(false).with_writer(writer))
            .try_init()?,
        LogFormat::Text => registry
            .with(fmt::layer().with_ansi(false).with_writer(writer))
            .try_init()?,
    }

    Ok(())
}

/// Install a stderr subscriber, for commands that never detach.
pub fn init_console_logging(directive: &str) -> Result<(), LoggingError> {
    tracing_subscriber::registry()
        .with(filter_for(directive))
        .with(fmt::layer().with_writer(io::stderr))
        .try_init()?;
    Ok(())
}
