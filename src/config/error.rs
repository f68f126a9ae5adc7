//! Field-level configuration errors and their aggregate.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// A stored value could not be converted to the type a field requires.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unable to cast {value} of type {found} to {target} for key {key}")]
pub struct CoercionError {
    pub key: String,
    pub value: String,
    pub found: &'static str,
    pub target: &'static str,
}

/// A correctly typed value that violates a domain constraint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("log file name must not be empty")]
    EmptyLogFileName,

    #[error("log file name must be a valid file path, {path} is not valid")]
    InvalidLogFileName { path: String },

    #[error("log level must be one of [{}], {value} is not valid", .allowed.join(", "))]
    InvalidLogLevel {
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("log format must be one of [{}], {value} is not valid", .allowed.join(", "))]
    InvalidLogFormat {
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("log max size must be between {min} and {max}, {value} is not valid")]
    LogMaxSizeOutOfRange { min: i64, max: i64, value: i64 },

    #[error("log max days must be between {min} and {max}, {value} is not valid")]
    LogMaxDaysOutOfRange { min: i64, max: i64, value: i64 },

    #[error("log max backups must be between {min} and {max}, {value} is not valid")]
    LogMaxBackupsOutOfRange { min: i64, max: i64, value: i64 },

    #[error("server port must be between {min} and {max}, {value} is not valid")]
    InvalidServerPort { min: i64, max: i64, value: i64 },

    #[error("pid file must not be empty")]
    EmptyPidFile,

    #[error("pid file must be a valid file path, {path} is not valid")]
    InvalidPidFile { path: String },

    #[error("could not resolve absolute path of {key} value {}: {reason}", .path.display())]
    Unresolvable {
        key: &'static str,
        path: PathBuf,
        reason: String,
    },
}

impl ValidationError {
    /// The configuration key this violation belongs to.
    pub fn key(&self) -> &'static str {
        use crate::config::keys::*;
        match self {
            ValidationError::EmptyLogFileName | ValidationError::InvalidLogFileName { .. } => {
                LOG_FILE_NAME_KEY
            }
            ValidationError::InvalidLogLevel { .. } => LOG_LEVEL_KEY,
            ValidationError::InvalidLogFormat { .. } => LOG_FORMAT_KEY,
            ValidationError::LogMaxSizeOutOfRange { .. } => LOG_MAX_SIZE_KEY,
            ValidationError::LogMaxDaysOutOfRange { .. } => LOG_MAX_DAYS_KEY,
            ValidationError::LogMaxBackupsOutOfRange { .. } => LOG_MAX_BACKUPS_KEY,
            ValidationError::InvalidServerPort { .. } => SERVER_PORT_KEY,
            ValidationError::EmptyPidFile | ValidationError::InvalidPidFile { .. } => {
                SERVER_PID_FILE_KEY
            }
            ValidationError::Unresolvable { key, .. } => *key,
        }
    }
}

/// One entry of an [`AggregateError`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error(transparent)]
    Coercion(#[from] CoercionError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl FieldError {
    pub fn key(&self) -> &str {
        match self {
            FieldError::Coercion(e) => &e.key,
            FieldError::Validation(e) => e.key(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FieldError::Coercion(_) => "coercion",
            FieldError::Validation(_) => "validation",
        }
    }
}

/// Every violation found by a validation pass, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateError {
    errors: Vec<FieldError>,
}

impl AggregateError {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: impl Into<FieldError>) {
        self.errors.push(error.into());
    }

    /// Take the coerced value, recording the failure and falling back to
    /// the zero value so the constraint check still runs.
    pub fn absorb<T: Default>(&mut self, result: Result<T, CoercionError>) -> T {
        match result {
            Ok(value) => value,
            Err(e) => {
                self.push(e);
                T::default()
            }
        }
    }

    /// Concatenate the entries of a child result.
    pub fn merge(&mut self, result: Result<(), AggregateError>) {
        if let Err(child) = result {
            self.errors.extend(child.errors);
        }
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.errors.iter()
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), AggregateError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn report(&self) -> Vec<ErrorEntry> {
        self.errors
            .iter()
            .map(|e| ErrorEntry {
                key: e.key().to_string(),
                kind: e.kind(),
                message: e.to_string(),
            })
            .collect()
    }
}

impl std::fmt::Display for AggregateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.errors.len() == 1 {
            writeln!(f, "1 error occurred:")?;
        } else {
            writeln!(f, "{} errors occurred:", self.errors.len())?;
        }
        for err in &self.errors {
            writeln!(f, "\t* {}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateError {}

impl<'a> IntoIterator for &'a AggregateError {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// Serializable view of a single entry.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorEntry {
    pub key: String,
    pub kind: &'static str,
    pub message: String,
}
