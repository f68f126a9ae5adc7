//! Command-line argument normalization.

use std::ffi::OsString;

/// Trim whitespace around a raw argument, keeping the `key=value` shape.
///
/// Only the first `=` splits, so the value may itself contain `=`.
pub fn trim_space_of_arg(arg: &str) -> String {
    match arg.split_once('=') {
        Some((name, value)) => format!("{}={}", name.trim(), value.trim()),
        None => arg.trim().to_string(),
    }
}

/// Trim an OS-encoded argument. Arguments that are not valid UTF-8 pass
/// through untouched.
pub fn trim_os_arg(arg: OsString) -> OsString {
    match arg.into_string() {
        Ok(arg) => OsString::from(trim_space_of_arg(&arg)),
        Err(raw) => raw,
    }
}
