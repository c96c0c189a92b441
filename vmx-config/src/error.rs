//! Error types for configuration parsing.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort loading a single configuration file.
///
/// Every variant names the file it came from, so callers scanning many
/// machines can report and skip the offending one.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed line {line_number} in {}: {line:?}", path.display())]
    MalformedLine {
        path: PathBuf,
        line_number: usize,
        line: String,
    },

    #[error("Invalid value for '{key}' at line {line_number} in {}: {value:?}", path.display())]
    InvalidValue {
        path: PathBuf,
        line_number: usize,
        key: String,
        value: String,
    },

    #[error("Invalid settings file {}: {message}", path.display())]
    Settings { path: PathBuf, message: String },
}

impl ConfigError {
    /// Path of the file that failed.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::FileAccess { path, .. }
            | Self::MalformedLine { path, .. }
            | Self::InvalidValue { path, .. }
            | Self::Settings { path, .. } => path,
        }
    }
}

/// A value that could not be coerced to the type its key declares.
///
/// Raised below the parser, which knows the file and line and lifts it into
/// [`ConfigError::InvalidValue`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid value for '{key}': {value:?}")]
pub struct ValueError {
    pub key: String,
    pub value: String,
}

impl ValueError {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}
