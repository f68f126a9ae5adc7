//! Shared fixtures for integration tests.

use std::path::Path;

use stagehand::config::keys::*;
use stagehand::config::{set_defaults, ConfigStore, Layer};

/// A store holding defaults rooted at `/opt/stagehand`, which validates.
#[allow(dead_code)]
pub fn default_store() -> ConfigStore {
    let mut store = ConfigStore::new();
    set_defaults(&mut store, Path::new("/opt/stagehand"));
    store
}

/// A store with an explicit, valid log section in the file layer.
#[allow(dead_code)]
pub fn store_with_log(level: &str, format: &str) -> ConfigStore {
    let mut store = default_store();
    store.set(Layer::File, LOG_FILE_NAME_KEY, "/var/log/app.log");
    store.set(Layer::File, LOG_LEVEL_KEY, level);
    store.set(Layer::File, LOG_FORMAT_KEY, format);
    store.set(Layer::File, LOG_MAX_SIZE_KEY, 50);
    store.set(Layer::File, LOG_MAX_DAYS_KEY, 30);
    store.set(Layer::File, LOG_MAX_BACKUPS_KEY, 10);
    store
}

/// Pairs shaped like `std::env::vars()` output.
#[allow(dead_code)]
pub fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
