//! Command-line interface.
//!
//! Every per-key flag takes a raw string; coercion and validation happen
//! later, together with values from the file and the environment.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::config::error::ErrorEntry;
use crate::config::keys::*;
use crate::config::{AggregateError, Settings};
use crate::lifecycle::startup::{default_base_dir, StartupOptions};

#[derive(Parser, Debug)]
#[command(name = "stagehand", version)]
#[command(about = "Daemon with layered, fully validated startup configuration", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Base directory for the default log and pid file locations
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,

    /// Run in the background (daemon.enable); bare `--daemon` means true,
    /// otherwise `--daemon=<BOOL>`
    #[arg(
        long,
        global = true,
        value_name = "BOOL",
        num_args = 0..=1,
        default_missing_value = "true",
        require_equals = true
    )]
    pub daemon: Option<String>,

    /// Log file path (log.fileName)
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<String>,

    /// Log level (log.level)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Log format, text or json (log.format)
    #[arg(long, global = true, value_name = "FORMAT")]
    pub log_format: Option<String>,

    /// Rotate the log file after this many MiB (log.maxSize)
    #[arg(long, global = true, value_name = "MIB")]
    pub log_max_size: Option<String>,

    /// Days to keep rotated log files (log.maxDays)
    #[arg(long, global = true, value_name = "DAYS")]
    pub log_max_days: Option<String>,

    /// Number of rotated log files to keep (log.maxBackups)
    #[arg(long, global = true, value_name = "COUNT")]
    pub log_max_backups: Option<String>,

    /// Status port (server.port)
    #[arg(long, global = true, value_name = "PORT")]
    pub server_port: Option<String>,

    /// Pid file path (server.pidFile)
    #[arg(long, global = true, value_name = "PATH")]
    pub server_pid_file: Option<String>,

    /// Set any key, e.g. --set log.maxDays=30
    #[arg(long = "set", global = true, value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub set: Vec<(String, String)>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Validate the configuration and run the daemon
    Start,
    /// Signal the daemon recorded in the pid file to terminate
    Stop,
    /// Validate the configuration and print the result
    Check {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got {:?}", raw)),
    }
}

impl Cli {
    /// Flag values as `(key, raw value)`; dedicated flags win over `--set`.
    pub fn flag_overrides(&self) -> Vec<(String, String)> {
        let mut flags = self.set.clone();
        let dedicated = [
            (DAEMON_KEY, &self.daemon),
            (LOG_FILE_NAME_KEY, &self.log_file),
            (LOG_LEVEL_KEY, &self.log_level),
            (LOG_FORMAT_KEY, &self.log_format),
            (LOG_MAX_SIZE_KEY, &self.log_max_size),
            (LOG_MAX_DAYS_KEY, &self.log_max_days),
            (LOG_MAX_BACKUPS_KEY, &self.log_max_backups),
            (SERVER_PORT_KEY, &self.server_port),
            (SERVER_PID_FILE_KEY, &self.server_pid_file),
        ];
        for (key, value) in dedicated {
            if let Some(value) = value {
                flags.push((key.to_string(), value.clone()));
            }
        }
        flags
    }

    pub fn startup_options(&self) -> StartupOptions {
        StartupOptions {
            config_file: self.config.clone(),
            base_dir: self.base_dir.clone().unwrap_or_else(default_base_dir),
            flags: self.flag_overrides(),
        }
    }
}

/// Output of `check`.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorEntry>,
}

impl CheckReport {
    pub fn from_result(result: Result<Settings, AggregateError>) -> Self {
        match result {
            Ok(settings) => Self {
                valid: true,
                settings: Some(settings),
                errors: Vec::new(),
            },
            Err(errors) => Self {
                valid: false,
                settings: None,
                errors: errors.report(),
            },
        }
    }
}
