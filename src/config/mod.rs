//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults.rs (lowest layer)
//!     → loader.rs (TOML file, then STAGEHAND_* environment)
//!     → CLI flags (cli module, highest layer)
//!     → store.rs (layered ConfigStore, highest layer wins)
//!     → validation.rs (coercion + semantic checks, all errors collected)
//!     → settings.rs (typed, normalized Settings)
//! ```
//!
//! # Design Decisions
//! - The store is an explicit value, never process-global
//! - Values stay loosely typed until validation coerces them
//! - Validation never writes back; normalized paths live in `Settings`

pub mod args;
pub mod coerce;
pub mod defaults;
pub mod error;
pub mod keys;
pub mod loader;
pub mod settings;
pub mod store;
pub mod validation;

pub use args::{trim_os_arg, trim_space_of_arg};
pub use defaults::set_defaults;
pub use error::{AggregateError, CoercionError, FieldError, ValidationError};
pub use settings::{LogFormat, LogSettings, ServerSettings, Settings};
pub use store::{ConfigStore, Layer};
pub use validation::{validate_config, validate_daemon, validate_log, validate_server};
