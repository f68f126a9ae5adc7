//! Configuration validation.
//!
//! # Responsibilities
//! - Coerce stored values to the types each field requires
//! - Validate value ranges, enum membership, paths and ports
//! - Report every violation, grouped per section
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - A failed coercion still runs the field's constraint with the zero
//!   value, so one bad field may contribute two entries
//! - Validation is a pure function of the store: `&ConfigStore` in,
//!   `Result<(), AggregateError>` out

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::config::coerce;
use crate::config::error::{AggregateError, ValidationError};
use crate::config::keys::*;
use crate::config::store::ConfigStore;

static UNIX_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(/[^/\x00]*)+/?$").expect("unix path pattern is valid"));

static WINDOWS_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^[a-zA-Z]:\\(?:[^\\/:*?"<>|\r\n]+\\)*[^\\/:*?"<>|\r\n]*$"#)
        .expect("windows path pattern is valid")
});

/// Longest path component list accepted after a drive prefix.
const MAX_WINDOWS_PATH: usize = 32_767;

/// Validate every section and merge the results.
pub fn validate_config(store: &ConfigStore) -> Result<(), AggregateError> {
    let mut errors = AggregateError::new();

    errors.merge(validate_daemon(store));
    errors.merge(validate_log(store));
    errors.merge(validate_server(store));

    errors.into_result()
}

/// Validate the daemon section.
pub fn validate_daemon(store: &ConfigStore) -> Result<(), AggregateError> {
    let mut errors = AggregateError::new();

    errors.absorb(coerce::to_bool(DAEMON_KEY, store.get(DAEMON_KEY)));

    errors.into_result()
}

/// Validate the log section.
pub fn validate_log(store: &ConfigStore) -> Result<(), AggregateError> {
    let mut errors = AggregateError::new();

    // log.fileName
    let file_name = errors.absorb(coerce::to_string(
        LOG_FILE_NAME_KEY,
        store.get(LOG_FILE_NAME_KEY),
    ));
    check_file_path(
        &mut errors,
        LOG_FILE_NAME_KEY,
        &file_name,
        ValidationError::EmptyLogFileName,
        |path| ValidationError::InvalidLogFileName { path },
    );

    // log.level
    let level = errors.absorb(coerce::to_string(LOG_LEVEL_KEY, store.get(LOG_LEVEL_KEY)));
    if !VALID_LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::InvalidLogLevel {
            value: level,
            allowed: &VALID_LOG_LEVELS,
        });
    }

    // log.format
    let format = errors.absorb(coerce::to_string(LOG_FORMAT_KEY, store.get(LOG_FORMAT_KEY)));
    if !VALID_LOG_FORMATS.contains(&format.as_str()) {
        errors.push(ValidationError::InvalidLogFormat {
            value: format,
            allowed: &VALID_LOG_FORMATS,
        });
    }

    // log.maxSize
    let max_size = errors.absorb(coerce::to_int(LOG_MAX_SIZE_KEY, store.get(LOG_MAX_SIZE_KEY)));
    if !in_range(max_size, MIN_LOG_MAX_SIZE, MAX_LOG_MAX_SIZE) {
        errors.push(ValidationError::LogMaxSizeOutOfRange {
            min: MIN_LOG_MAX_SIZE,
            max: MAX_LOG_MAX_SIZE,
            value: max_size,
        });
    }

    // log.maxDays
    let max_days = errors.absorb(coerce::to_int(LOG_MAX_DAYS_KEY, store.get(LOG_MAX_DAYS_KEY)));
    if !in_range(max_days, MIN_LOG_MAX_DAYS, MAX_LOG_MAX_DAYS) {
        errors.push(ValidationError::LogMaxDaysOutOfRange {
            min: MIN_LOG_MAX_DAYS,
            max: MAX_LOG_MAX_DAYS,
            value: max_days,
        });
    }

    // log.maxBackups
    let max_backups = errors.absorb(coerce::to_int(
        LOG_MAX_BACKUPS_KEY,
        store.get(LOG_MAX_BACKUPS_KEY),
    ));
    if !in_range(max_backups, MIN_LOG_MAX_BACKUPS, MAX_LOG_MAX_BACKUPS) {
        errors.push(ValidationError::LogMaxBackupsOutOfRange {
            min: MIN_LOG_MAX_BACKUPS,
            max: MAX_LOG_MAX_BACKUPS,
            value: max_backups,
        });
    }

    errors.into_result()
}

/// Validate the server section.
pub fn validate_server(store: &ConfigStore) -> Result<(), AggregateError> {
    let mut errors = AggregateError::new();

    // server.port
    let port = errors.absorb(coerce::to_int(SERVER_PORT_KEY, store.get(SERVER_PORT_KEY)));
    if !is_port(port) {
        errors.push(ValidationError::InvalidServerPort {
            min: MIN_PORT,
            max: MAX_PORT,
            value: port,
        });
    }

    // server.pidFile
    let pid_file = errors.absorb(coerce::to_string(
        SERVER_PID_FILE_KEY,
        store.get(SERVER_PID_FILE_KEY),
    ));
    check_file_path(
        &mut errors,
        SERVER_PID_FILE_KEY,
        &pid_file,
        ValidationError::EmptyPidFile,
        |path| ValidationError::InvalidPidFile { path },
    );

    errors.into_result()
}

fn check_file_path(
    errors: &mut AggregateError,
    key: &'static str,
    raw: &str,
    empty: ValidationError,
    invalid: fn(String) -> ValidationError,
) {
    let raw = raw.trim();
    if raw.is_empty() {
        errors.push(empty);
        return;
    }

    match absolutize(key, raw) {
        Ok(path) => {
            let rendered = path.to_string_lossy();
            if !is_file_path(&rendered) {
                errors.push(invalid(rendered.into_owned()));
            }
        }
        Err(e) => errors.push(e),
    }
}

/// Absolute form of a configured path. Relative paths resolve against the
/// working directory without touching the filesystem.
pub fn absolutize(key: &'static str, raw: &str) -> Result<PathBuf, ValidationError> {
    let path = Path::new(raw);
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    std::path::absolute(path).map_err(|e| ValidationError::Unresolvable {
        key,
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Syntactic check for an absolute Unix or Windows file path.
pub fn is_file_path(path: &str) -> bool {
    if WINDOWS_PATH.is_match(path) {
        return path.len() - 3 <= MAX_WINDOWS_PATH;
    }
    UNIX_PATH.is_match(path)
}

pub fn is_port(port: i64) -> bool {
    in_range(port, MIN_PORT, MAX_PORT)
}

fn in_range(value: i64, min: i64, max: i64) -> bool {
    (min..=max).contains(&value)
}
