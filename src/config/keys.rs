//! Configuration keys, defaults and bounds.
//!
//! Keys are written in their canonical camelCase form; the store
//! normalizes them to lower case on every access.

/// Name used for the binary, the PID file and the environment prefix.
pub const DEFAULT_COMMAND_NAME: &str = "stagehand";

/// Prefix for environment variable overrides (`STAGEHAND_LOG_LEVEL`).
pub const ENV_PREFIX: &str = "STAGEHAND";

// daemon
pub const DAEMON_KEY: &str = "daemon.enable";
pub const DEFAULT_DAEMON: bool = false;

// log
pub const LOG_FILE_NAME_KEY: &str = "log.fileName";
pub const LOG_LEVEL_KEY: &str = "log.level";
pub const LOG_FORMAT_KEY: &str = "log.format";
pub const LOG_MAX_SIZE_KEY: &str = "log.maxSize";
pub const LOG_MAX_DAYS_KEY: &str = "log.maxDays";
pub const LOG_MAX_BACKUPS_KEY: &str = "log.maxBackups";

pub const DEFAULT_LOG_DIR: &str = "log";
pub const DEFAULT_LOG_FILE_NAME: &str = "run.log";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_FORMAT: &str = "text";
/// Maximum size of the active log file, in MiB.
pub const DEFAULT_LOG_MAX_SIZE: i64 = 100;
pub const DEFAULT_LOG_MAX_DAYS: i64 = 7;
pub const DEFAULT_LOG_MAX_BACKUPS: i64 = 5;

pub const MIN_LOG_MAX_SIZE: i64 = 1;
pub const MAX_LOG_MAX_SIZE: i64 = 10_240;
pub const MIN_LOG_MAX_DAYS: i64 = 1;
pub const MAX_LOG_MAX_DAYS: i64 = 3_650;
pub const MIN_LOG_MAX_BACKUPS: i64 = 1;
pub const MAX_LOG_MAX_BACKUPS: i64 = 1_000;

pub const VALID_LOG_LEVELS: [&str; 6] = ["debug", "info", "warn", "warning", "error", "fatal"];
pub const VALID_LOG_FORMATS: [&str; 2] = ["text", "json"];

// server
pub const SERVER_PORT_KEY: &str = "server.port";
pub const SERVER_PID_FILE_KEY: &str = "server.pidFile";

pub const DEFAULT_SERVER_PORT: i64 = 6090;
pub const MIN_PORT: i64 = 1;
pub const MAX_PORT: i64 = 65_535;

/// Every key this crate defaults and validates, in validation order.
pub const ALL_KEYS: [&str; 9] = [
    DAEMON_KEY,
    LOG_FILE_NAME_KEY,
    LOG_LEVEL_KEY,
    LOG_FORMAT_KEY,
    LOG_MAX_SIZE_KEY,
    LOG_MAX_DAYS_KEY,
    LOG_MAX_BACKUPS_KEY,
    SERVER_PORT_KEY,
    SERVER_PID_FILE_KEY,
];

/// Environment variable consulted for `key`, e.g. `STAGEHAND_LOG_MAXSIZE`.
pub fn env_var_for(key: &str) -> String {
    format!("{}_{}", ENV_PREFIX, key.replace('.', "_").to_uppercase())
}
