//! Typed settings built from a validated store.
//!
//! The store keeps whatever the sources provided; `Settings` is the
//! normalized form the rest of the daemon reads, with coerced types and
//! absolute paths.

use std::path::PathBuf;

use serde::Serialize;

use crate::config::coerce;
use crate::config::error::AggregateError;
use crate::config::keys::*;
use crate::config::store::ConfigStore;
use crate::config::validation::{absolutize, validate_config};

/// Root settings for the daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub daemon: DaemonSettings,
    pub log: LogSettings,
    pub server: ServerSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaemonSettings {
    /// Detach into the background on start.
    pub enable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogSettings {
    /// Absolute path of the active log file.
    pub file_name: PathBuf,
    /// One of the accepted level names, as configured.
    pub level: String,
    pub format: LogFormat,
    /// MiB before the active file is rotated.
    pub max_size: u64,
    pub max_days: u64,
    pub max_backups: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerSettings {
    pub port: u16,
    /// Absolute path of the PID file.
    pub pid_file: PathBuf,
}

impl LogSettings {
    /// Filter directive for the configured level.
    pub fn filter_directive(&self) -> &'static str {
        match self.level.as_str() {
            "debug" => "debug",
            "warn" | "warning" => "warn",
            "error" | "fatal" => "error",
            _ => "info",
        }
    }
}

impl Settings {
    /// Validate `store` and extract typed settings.
    ///
    /// Fails with the same aggregate [`validate_config`] reports.
    pub fn from_store(store: &ConfigStore) -> Result<Self, AggregateError> {
        validate_config(store)?;

        // Validation passed, so every coercion below succeeds.
        let mut errors = AggregateError::new();
        let enable = errors.absorb(coerce::to_bool(DAEMON_KEY, store.get(DAEMON_KEY)));
        let file_name = errors.absorb(coerce::to_string(
            LOG_FILE_NAME_KEY,
            store.get(LOG_FILE_NAME_KEY),
        ));
        let level = errors.absorb(coerce::to_string(LOG_LEVEL_KEY, store.get(LOG_LEVEL_KEY)));
        let format = errors.absorb(coerce::to_string(LOG_FORMAT_KEY, store.get(LOG_FORMAT_KEY)));
        let max_size = errors.absorb(coerce::to_int(LOG_MAX_SIZE_KEY, store.get(LOG_MAX_SIZE_KEY)));
        let max_days = errors.absorb(coerce::to_int(LOG_MAX_DAYS_KEY, store.get(LOG_MAX_DAYS_KEY)));
        let max_backups = errors.absorb(coerce::to_int(
            LOG_MAX_BACKUPS_KEY,
            store.get(LOG_MAX_BACKUPS_KEY),
        ));
        let port = errors.absorb(coerce::to_int(SERVER_PORT_KEY, store.get(SERVER_PORT_KEY)));
        let pid_file = errors.absorb(coerce::to_string(
            SERVER_PID_FILE_KEY,
            store.get(SERVER_PID_FILE_KEY),
        ));

        let file_name = match absolutize(LOG_FILE_NAME_KEY, file_name.trim()) {
            Ok(path) => path,
            Err(e) => {
                errors.push(e);
                PathBuf::new()
            }
        };
        let pid_file = match absolutize(SERVER_PID_FILE_KEY, pid_file.trim()) {
            Ok(path) => path,
            Err(e) => {
                errors.push(e);
                PathBuf::new()
            }
        };
        errors.into_result()?;

        Ok(Settings {
            daemon: DaemonSettings { enable },
            log: LogSettings {
                file_name,
                level,
                format: if format == "json" {
                    LogFormat::Json
                } else {
                    LogFormat::Text
                },
                max_size: max_size.unsigned_abs(),
                max_days: max_days.unsigned_abs(),
                max_backups: max_backups.unsigned_abs(),
            },
            server: ServerSettings {
                port: u16::try_from(port).unwrap_or_default(),
                pid_file,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::set_defaults;
    use crate::config::store::Layer;
    use std::path::Path;

    #[test]
    fn from_defaults() {
        let mut store = ConfigStore::new();
        set_defaults(&mut store, Path::new("/opt/stagehand"));

        let settings = Settings::from_store(&store).unwrap();
        assert!(!settings.daemon.enable);
        assert_eq!(settings.log.file_name, PathBuf::from("/opt/stagehand/log/run.log"));
        assert_eq!(settings.log.format, LogFormat::Text);
        assert_eq!(settings.log.max_size, 100);
        assert_eq!(settings.server.port, 6090);
        assert_eq!(settings.server.pid_file, PathBuf::from("/opt/stagehand/stagehand.pid"));
    }

    #[test]
    fn string_values_are_typed_and_paths_absolute() {
        let mut store = ConfigStore::new();
        set_defaults(&mut store, Path::new("/opt/stagehand"));
        store.set(Layer::Env, DAEMON_KEY, "true");
        store.set(Layer::Env, SERVER_PORT_KEY, "8080");
        store.set(Layer::Flag, SERVER_PID_FILE_KEY, " run/stagehand.pid ");
        store.set(Layer::Flag, LOG_FORMAT_KEY, "json");

        let settings = Settings::from_store(&store).unwrap();
        assert!(settings.daemon.enable);
        assert_eq!(settings.server.port, 8080);
        assert!(settings.server.pid_file.is_absolute());
        assert!(settings.server.pid_file.ends_with("run/stagehand.pid"));
        assert_eq!(settings.log.format, LogFormat::Json);

        // the store still holds the raw value
        assert_eq!(
            store.get(SERVER_PID_FILE_KEY),
            Some(&toml::Value::from(" run/stagehand.pid "))
        );
    }

    #[test]
    fn invalid_store_yields_validation_aggregate() {
        let mut store = ConfigStore::new();
        set_defaults(&mut store, Path::new("/opt/stagehand"));
        store.set(Layer::File, LOG_LEVEL_KEY, "verbose");
        store.set(Layer::File, SERVER_PORT_KEY, 0);

        let err = Settings::from_store(&store).unwrap_err();
        assert_eq!(err, validate_config(&store).unwrap_err());
        assert_eq!(err.len(), 2);
    }

    #[test]
    fn level_directives() {
        let mut store = ConfigStore::new();
        set_defaults(&mut store, Path::new("/srv"));
        for (level, directive) in [
            ("debug", "debug"),
            ("info", "info"),
            ("warning", "warn"),
            ("fatal", "error"),
        ] {
            store.set(Layer::Flag, LOG_LEVEL_KEY, level);
            let settings = Settings::from_store(&store).unwrap();
            assert_eq!(settings.log.filter_directive(), directive);
        }
    }
}
