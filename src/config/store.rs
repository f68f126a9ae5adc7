//! Layered key-value configuration store.
//!
//! Values are loosely typed (`toml::Value`) and keyed by dotted names.
//! Each source writes into its own layer; reads resolve from the highest
//! layer that holds the key, so defaults never shadow explicit values.

use std::collections::{BTreeMap, BTreeSet};

use toml::Value;

/// Priority level of a configuration source, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Default,
    File,
    Env,
    Flag,
    Override,
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Layer::Default => "default",
            Layer::File => "file",
            Layer::Env => "env",
            Layer::Flag => "flag",
            Layer::Override => "override",
        };
        f.write_str(name)
    }
}

/// Explicit configuration context passed to defaulting and validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigStore {
    layers: BTreeMap<Layer, BTreeMap<String, Value>>,
}

fn normalize(key: &str) -> String {
    key.trim().to_lowercase()
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a default. Replaces an earlier default for the same key but
    /// never affects values held by higher layers.
    pub fn set_default(&mut self, key: &str, value: impl Into<Value>) {
        self.set(Layer::Default, key, value);
    }

    pub fn set(&mut self, layer: Layer, key: &str, value: impl Into<Value>) {
        self.layers
            .entry(layer)
            .or_default()
            .insert(normalize(key), value.into());
    }

    /// Resolve `key` from the highest layer holding it.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let key = normalize(key);
        self.layers.values().rev().find_map(|layer| layer.get(&key))
    }

    /// Which layer currently supplies `key`.
    pub fn layer_of(&self, key: &str) -> Option<Layer> {
        let key = normalize(key);
        self.layers
            .iter()
            .rev()
            .find(|(_, values)| values.contains_key(&key))
            .map(|(layer, _)| *layer)
    }

    pub fn is_set(&self, key: &str) -> bool {
        self.layer_of(key).is_some()
    }

    /// All keys known to any layer, normalized.
    pub fn keys(&self) -> BTreeSet<String> {
        self.layers
            .values()
            .flat_map(|values| values.keys().cloned())
            .collect()
    }

    pub fn layer(&self, layer: Layer) -> Option<&BTreeMap<String, Value>> {
        self.layers.get(&layer)
    }

    pub fn clear_layer(&mut self, layer: Layer) {
        self.layers.remove(&layer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_layer_wins() {
        let mut store = ConfigStore::new();
        store.set_default("log.level", "info");
        store.set(Layer::File, "log.level", "debug");
        assert_eq!(store.get("log.level"), Some(&Value::from("debug")));
        assert_eq!(store.layer_of("log.level"), Some(Layer::File));

        store.set(Layer::Flag, "log.level", "error");
        store.set(Layer::Env, "log.level", "warn");
        assert_eq!(store.get("log.level"), Some(&Value::from("error")));
    }

    #[test]
    fn keys_are_case_insensitive() {
        let mut store = ConfigStore::new();
        store.set(Layer::File, "log.fileName", "/tmp/a.log");
        assert!(store.is_set("LOG.FILENAME"));
        assert_eq!(store.get("log.filename"), Some(&Value::from("/tmp/a.log")));
        assert!(store.keys().contains("log.filename"));
    }

    #[test]
    fn default_does_not_shadow_explicit_value() {
        let mut store = ConfigStore::new();
        store.set(Layer::Env, "server.port", "8080");
        store.set_default("server.port", 6090);
        assert_eq!(store.get("server.port"), Some(&Value::from("8080")));

        store.clear_layer(Layer::Env);
        assert_eq!(store.get("server.port"), Some(&Value::from(6090)));
    }

    #[test]
    fn missing_key() {
        let store = ConfigStore::new();
        assert!(store.get("daemon.enable").is_none());
        assert!(!store.is_set("daemon.enable"));
        assert!(store.layer(Layer::Default).is_none());
    }
}
