//! The GUI application's list of registered machines.
//!
//! The registry uses the same `key = "value"` line format as a `.vmx` file,
//! with one `vmlist<N>.config` entry per machine the GUI knows about. A
//! machine that is not registered is treated as headless.

use std::path::{Path, PathBuf};

use tracing::debug;
use vmx_config::router::{extract_index, IndexMatch};
use vmx_config::{ConfigError, ConfigFileParser, ConfigSink, Disposition, ValueError};

const ENTRY_PREFIX: &str = "vmlist";
const ENTRY_FIELD: &str = "config";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuiRegistry {
    paths: Vec<PathBuf>,
}

/// Collects `vmlist<N>.config` values and ignores everything else.
struct RegistrySink<'a> {
    paths: &'a mut Vec<PathBuf>,
}

impl ConfigSink for RegistrySink<'_> {
    fn parse_value(&mut self, key: &str, value: &str) -> Result<Disposition, ValueError> {
        let Some((entry, field)) = key.split_once('.') else {
            return Ok(Disposition::Unhandled);
        };
        match extract_index(entry, ENTRY_PREFIX) {
            IndexMatch::Index(_) if field == ENTRY_FIELD && !value.is_empty() => {
                self.paths.push(PathBuf::from(value));
                Ok(Disposition::Handled)
            }
            _ => Ok(Disposition::Unhandled),
        }
    }

    fn store_unhandled(&mut self, _key: &str, _value: &str) {}
}

impl GuiRegistry {
    /// Read the registry at `path`. A missing file means nothing is registered.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(registry = %path.display(), "no GUI registry");
            return Ok(Self::default());
        }
        let mut paths = Vec::new();
        ConfigFileParser::new(path).load(&mut RegistrySink { paths: &mut paths })?;
        debug!(registry = %path.display(), registered = paths.len(), "loaded GUI registry");
        Ok(Self { paths })
    }

    pub fn parse_str(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        let mut paths = Vec::new();
        ConfigFileParser::new(path).parse_str(contents, &mut RegistrySink { paths: &mut paths })?;
        Ok(Self { paths })
    }

    /// Whether `vmx` is registered with the GUI.
    pub fn contains(&self, vmx: &Path) -> bool {
        self.paths.iter().any(|p| p == vmx)
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}
