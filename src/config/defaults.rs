//! Default configuration, the lowest-priority layer.

use std::path::Path;

use crate::config::keys::*;
use crate::config::store::ConfigStore;

/// Install defaults for every known key.
///
/// Defaults live in their own layer, so this is idempotent and never
/// overrides values that came from a file, the environment or flags.
pub fn set_defaults(store: &mut ConfigStore, base_dir: &Path) {
    // daemon
    store.set_default(DAEMON_KEY, DEFAULT_DAEMON);

    // log
    let log_file = base_dir.join(DEFAULT_LOG_DIR).join(DEFAULT_LOG_FILE_NAME);
    store.set_default(LOG_FILE_NAME_KEY, log_file.to_string_lossy().into_owned());
    store.set_default(LOG_LEVEL_KEY, DEFAULT_LOG_LEVEL);
    store.set_default(LOG_FORMAT_KEY, DEFAULT_LOG_FORMAT);
    store.set_default(LOG_MAX_SIZE_KEY, DEFAULT_LOG_MAX_SIZE);
    store.set_default(LOG_MAX_DAYS_KEY, DEFAULT_LOG_MAX_DAYS);
    store.set_default(LOG_MAX_BACKUPS_KEY, DEFAULT_LOG_MAX_BACKUPS);

    // server
    store.set_default(SERVER_PORT_KEY, DEFAULT_SERVER_PORT);
    let pid_file = base_dir.join(format!("{}.pid", DEFAULT_COMMAND_NAME));
    store.set_default(SERVER_PID_FILE_KEY, pid_file.to_string_lossy().into_owned());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::store::Layer;
    use toml::Value;

    #[test]
    fn installs_every_key() {
        let mut store = ConfigStore::new();
        set_defaults(&mut store, Path::new("/opt/stagehand"));

        for key in ALL_KEYS {
            assert_eq!(store.layer_of(key), Some(Layer::Default), "{key}");
        }
        assert_eq!(
            store.get(LOG_FILE_NAME_KEY),
            Some(&Value::from("/opt/stagehand/log/run.log"))
        );
        assert_eq!(
            store.get(SERVER_PID_FILE_KEY),
            Some(&Value::from("/opt/stagehand/stagehand.pid"))
        );
        assert_eq!(store.get(SERVER_PORT_KEY), Some(&Value::Integer(6090)));
        assert_eq!(store.get(DAEMON_KEY), Some(&Value::Boolean(false)));
    }

    #[test]
    fn idempotent() {
        let mut once = ConfigStore::new();
        set_defaults(&mut once, Path::new("/srv"));

        let mut twice = ConfigStore::new();
        set_defaults(&mut twice, Path::new("/srv"));
        set_defaults(&mut twice, Path::new("/srv"));

        assert_eq!(once, twice);
    }

    #[test]
    fn keeps_explicit_values() {
        let mut store = ConfigStore::new();
        store.set(Layer::File, LOG_LEVEL_KEY, "debug");
        store.set(Layer::Flag, SERVER_PORT_KEY, "7000");
        set_defaults(&mut store, Path::new("/srv"));

        assert_eq!(store.get(LOG_LEVEL_KEY), Some(&Value::from("debug")));
        assert_eq!(store.get(SERVER_PORT_KEY), Some(&Value::from("7000")));
    }
}
