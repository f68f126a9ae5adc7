//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the configuration store in priority order
//! - Validate it as a whole and produce typed `Settings`
//!
//! # Design Decisions
//! - Fail fast: an invalid configuration stops startup before anything
//!   is spawned, written or bound
//! - The environment is passed in, never read implicitly

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::loader::{apply_env, load_file, LoadError};
use crate::config::{set_defaults, AggregateError, ConfigStore, Layer, Settings};

/// Where configuration comes from, apart from the environment.
#[derive(Debug, Clone, Default)]
pub struct StartupOptions {
    /// Optional TOML file.
    pub config_file: Option<PathBuf>,
    /// Base directory for default log and pid file paths.
    pub base_dir: PathBuf,
    /// `(key, raw value)` pairs from the command line.
    pub flags: Vec<(String, String)>,
}

#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] AggregateError),
}

/// Directory of the running executable, falling back to the working
/// directory.
pub fn default_base_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Keep the variables whose name and value are both valid UTF-8.
///
/// Meant for `std::env::vars_os()`; an undecodable variable never names a
/// known key, so it is skipped rather than aborting startup.
pub fn utf8_env<I>(vars: I) -> impl Iterator<Item = (String, String)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
}

/// Layer defaults, file, environment and flags into one store.
pub fn build_store<I>(options: &StartupOptions, env: I) -> Result<ConfigStore, LoadError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut store = ConfigStore::new();
    set_defaults(&mut store, &options.base_dir);

    if let Some(path) = &options.config_file {
        let keys = load_file(&mut store, path)?;
        tracing::info!(path = %path.display(), keys, "Configuration file loaded");
    }

    let from_env = apply_env(&mut store, env);
    for (key, value) in &options.flags {
        store.set(Layer::Flag, key, value.as_str());
    }

    tracing::debug!(
        env_overrides = from_env,
        flag_overrides = options.flags.len(),
        "Configuration store built"
    );
    Ok(store)
}

/// Build the store and validate it into `Settings`.
pub fn prepare<I>(options: &StartupOptions, env: I) -> Result<(ConfigStore, Settings), StartupError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let store = build_store(options, env)?;
    let settings = Settings::from_store(&store)?;
    Ok((store, settings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::keys::*;

    fn options(base_dir: &Path) -> StartupOptions {
        StartupOptions {
            config_file: None,
            base_dir: base_dir.to_path_buf(),
            flags: Vec::new(),
        }
    }

    #[test]
    fn defaults_only() {
        let (store, settings) = prepare(&options(Path::new("/opt/app")), Vec::new()).unwrap();
        assert_eq!(store.layer_of(SERVER_PORT_KEY), Some(Layer::Default));
        assert_eq!(settings.log.file_name, PathBuf::from("/opt/app/log/run.log"));
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let mut opts = options(Path::new("/opt/app"));
        opts.config_file = Some(PathBuf::from("/nonexistent/stagehand.toml"));
        assert!(matches!(
            prepare(&opts, Vec::new()),
            Err(StartupError::Load(LoadError::Io { .. }))
        ));
    }

    #[test]
    fn flags_beat_env() {
        let mut opts = options(Path::new("/opt/app"));
        opts.flags.push((SERVER_PORT_KEY.to_string(), "7001".to_string()));
        let env = vec![("STAGEHAND_SERVER_PORT".to_string(), "7000".to_string())];

        let (store, settings) = prepare(&opts, env).unwrap();
        assert_eq!(settings.server.port, 7001);
        assert_eq!(store.layer_of(SERVER_PORT_KEY), Some(Layer::Flag));
    }

    #[test]
    fn invalid_values_surface_together() {
        let env = vec![
            ("STAGEHAND_LOG_LEVEL".to_string(), "loud".to_string()),
            ("STAGEHAND_SERVER_PORT".to_string(), "http".to_string()),
        ];
        match prepare(&options(Path::new("/opt/app")), env) {
            Err(StartupError::Invalid(errors)) => {
                // level, plus coercion and range for the port
                assert_eq!(errors.len(), 3);
            }
            other => panic!("expected invalid configuration, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn undecodable_env_is_skipped() {
        use std::os::unix::ffi::OsStringExt;

        let env = vec![
            (OsString::from("UNRELATED"), OsString::from_vec(vec![0xff])),
            (OsString::from_vec(vec![b'X', 0xfe]), OsString::from("1")),
            (OsString::from("STAGEHAND_SERVER_PORT"), OsString::from("7003")),
        ];

        let (store, settings) = prepare(&options(Path::new("/opt/app")), utf8_env(env)).unwrap();
        assert_eq!(settings.server.port, 7003);
        assert_eq!(store.layer_of(SERVER_PORT_KEY), Some(Layer::Env));
    }
}
