//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;
use toml::{Table, Value};

use crate::config::keys::{env_var_for, ALL_KEYS};
use crate::config::store::{ConfigStore, Layer};

/// Error type for configuration loading.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Read a TOML file into the file layer, replacing whatever it held.
///
/// Returns the number of keys loaded.
pub fn load_file(store: &mut ConfigStore, path: &Path) -> Result<usize, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_str(store, &content).map_err(|source| LoadError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Parse TOML text into the file layer.
pub fn load_str(store: &mut ConfigStore, content: &str) -> Result<usize, toml::de::Error> {
    let table: Table = toml::from_str(content)?;

    let mut flat = Vec::new();
    flatten("", table, &mut flat);

    store.clear_layer(Layer::File);
    let count = flat.len();
    for (key, value) in flat {
        store.set(Layer::File, &key, value);
    }

    tracing::debug!(keys = count, "Config file parsed");
    Ok(count)
}

/// `[log] maxSize = 5` becomes `log.maxSize = 5`. Arrays stay values.
fn flatten(prefix: &str, table: Table, out: &mut Vec<(String, Value)>) {
    for (name, value) in table {
        let key = if prefix.is_empty() {
            name
        } else {
            format!("{}.{}", prefix, name)
        };
        match value {
            Value::Table(nested) => flatten(&key, nested, out),
            other => out.push((key, other)),
        }
    }
}

/// Copy `STAGEHAND_*` variables for known keys into the env layer.
///
/// Takes the variables explicitly so callers decide where they come from.
pub fn apply_env<I>(store: &mut ConfigStore, vars: I) -> usize
where
    I: IntoIterator<Item = (String, String)>,
{
    let wanted: Vec<(String, &str)> = ALL_KEYS.iter().map(|k| (env_var_for(k), *k)).collect();

    store.clear_layer(Layer::Env);
    let mut applied = 0;
    for (name, value) in vars {
        if let Some((_, key)) = wanted.iter().find(|(var, _)| *var == name) {
            tracing::debug!(variable = %name, key = %key, "Environment override");
            store.set(Layer::Env, key, value);
            applied += 1;
        }
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::keys::*;

    #[test]
    fn flattens_sections() {
        let mut store = ConfigStore::new();
        let count = load_str(
            &mut store,
            r#"
            [daemon]
            enable = true

            [log]
            fileName = "/var/log/stagehand.log"
            maxSize = 50

            [server]
            port = 8080
            "#,
        )
        .unwrap();

        assert_eq!(count, 4);
        assert_eq!(store.get(DAEMON_KEY), Some(&Value::Boolean(true)));
        assert_eq!(store.get(LOG_MAX_SIZE_KEY), Some(&Value::Integer(50)));
        assert_eq!(store.get(SERVER_PORT_KEY), Some(&Value::Integer(8080)));
        assert_eq!(store.layer_of(LOG_FILE_NAME_KEY), Some(Layer::File));
    }

    #[test]
    fn dotted_keys_and_case() {
        let mut store = ConfigStore::new();
        load_str(&mut store, "\"log.LEVEL\" = \"warn\"\nlog.format = \"json\"").unwrap();
        assert_eq!(store.get(LOG_LEVEL_KEY), Some(&Value::from("warn")));
        assert_eq!(store.get(LOG_FORMAT_KEY), Some(&Value::from("json")));
    }

    #[test]
    fn reload_replaces_file_layer() {
        let mut store = ConfigStore::new();
        load_str(&mut store, "[log]\nlevel = \"debug\"").unwrap();
        load_str(&mut store, "[server]\nport = 9000").unwrap();
        assert!(store.get(LOG_LEVEL_KEY).is_none());
        assert_eq!(store.get(SERVER_PORT_KEY), Some(&Value::Integer(9000)));
    }

    #[test]
    fn parse_error() {
        let mut store = ConfigStore::new();
        assert!(load_str(&mut store, "[log\nlevel = ").is_err());
    }

    #[test]
    fn env_overrides_known_keys_only() {
        let mut store = ConfigStore::new();
        let applied = apply_env(
            &mut store,
            vec![
                ("STAGEHAND_LOG_MAXSIZE".to_string(), "64".to_string()),
                ("STAGEHAND_SERVER_PIDFILE".to_string(), "/run/s.pid".to_string()),
                ("STAGEHAND_UNKNOWN".to_string(), "x".to_string()),
                ("PATH".to_string(), "/usr/bin".to_string()),
            ],
        );

        assert_eq!(applied, 2);
        assert_eq!(store.get(LOG_MAX_SIZE_KEY), Some(&Value::from("64")));
        assert_eq!(store.layer_of(SERVER_PID_FILE_KEY), Some(Layer::Env));
        assert_eq!(store.keys().len(), 2);
    }
}
