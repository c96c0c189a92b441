//! Line-oriented `key = value` file parser.
//!
//! The parser knows nothing about what keys mean. Each assignment is handed
//! to a [`ConfigSink`]; keys the sink declines are passed back to it through
//! [`ConfigSink::store_unhandled`] so an unknown key never aborts a parse.

// Standard library
use std::fs;
use std::path::{Path, PathBuf};

// External crates
use tracing::{debug, trace};

// Internal imports
use crate::error::{ConfigError, ValueError};

/// Lines whose first non-blank character is this are ignored.
pub const COMMENT_MARKER: char = '#';

const QUOTES: [char; 2] = ['"', '\''];

/// Whether a sink consumed a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Handled,
    Unhandled,
}

/// Receiver of parsed assignments.
pub trait ConfigSink {
    /// Interpret one assignment. Only values that cannot be coerced to the
    /// type their key declares are errors.
    fn parse_value(&mut self, key: &str, value: &str) -> Result<Disposition, ValueError>;

    /// Keep an assignment [`parse_value`](Self::parse_value) declined.
    fn store_unhandled(&mut self, key: &str, value: &str);
}

/// One meaningful line of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    Blank,
    Assignment { key: &'a str, value: &'a str },
}

/// Split a line into key and unquoted value.
///
/// Returns `None` for a content line without `=` or with an empty key.
pub fn split_line(line: &str) -> Option<Line<'_>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(COMMENT_MARKER) {
        return Some(Line::Blank);
    }

    let (key, value) = trimmed.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }

    Some(Line::Assignment {
        key,
        value: strip_quotes(value.trim()),
    })
}

/// Remove exactly one layer of matching quotes.
pub fn strip_quotes(value: &str) -> &str {
    for quote in QUOTES {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Parser bound to one configuration file path.
#[derive(Debug, Clone)]
pub struct ConfigFileParser {
    path: PathBuf,
}

impl ConfigFileParser {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file and feed every assignment to `sink`.
    ///
    /// The file is read in one call and closed before parsing starts.
    /// Bytes that are not valid UTF-8 are replaced rather than rejected.
    pub fn load<S: ConfigSink>(&self, sink: &mut S) -> Result<(), ConfigError> {
        let bytes = fs::read(&self.path).map_err(|source| ConfigError::FileAccess {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "read configuration file");

        self.parse_str(&String::from_utf8_lossy(&bytes), sink)
    }

    /// Feed every assignment in `contents` to `sink`, stopping at the first
    /// malformed line or invalid value.
    pub fn parse_str<S: ConfigSink>(&self, contents: &str, sink: &mut S) -> Result<(), ConfigError> {
        for (number, raw) in contents.lines().enumerate() {
            let line_number = number + 1;
            let (key, value) = match split_line(raw) {
                Some(Line::Blank) => continue,
                Some(Line::Assignment { key, value }) => (key, value),
                None => {
                    return Err(ConfigError::MalformedLine {
                        path: self.path.clone(),
                        line_number,
                        line: raw.to_string(),
                    })
                }
            };

            match sink.parse_value(key, value) {
                Ok(Disposition::Handled) => {}
                Ok(Disposition::Unhandled) => {
                    trace!(key = %key, "storing unrecognized key");
                    sink.store_unhandled(key, value);
                }
                Err(err) => {
                    return Err(ConfigError::InvalidValue {
                        path: self.path.clone(),
                        line_number,
                        key: err.key,
                        value: err.value,
                    })
                }
            }
        }

        Ok(())
    }
}
