//! Inventory settings for the VMX tool
//!
//! This module defines the structure of the ~/.vmx/config.yaml file, which
//! tells the inventory where the hypervisor application lives, which
//! directories hold guest machines and how autoresume markers are named.

// Standard library
use std::fs;
use std::path::{Path, PathBuf};

// External crates
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

// Internal imports
use crate::error::ConfigError;

pub const DEFAULT_AUTORESUME_FILENAME: &str = ".autoresume";

/// Location of the control utility inside the application bundle.
pub const VMRUN_RELATIVE_PATH: &str = "Contents/Library/vmrun";

/// Root structure for inventory configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventorySettings {
    /// Hypervisor application bundle
    #[serde(default = "default_application_path")]
    pub application_path: PathBuf,

    /// Marker file name written next to a suspended headless machine
    #[serde(default = "default_autoresume_filename")]
    pub autoresume_filename: String,

    /// Directories searched recursively for `.vmx` files
    #[serde(default = "default_directories")]
    pub directories: Vec<PathBuf>,

    /// The GUI application's machine registry; `null` disables the lookup
    #[serde(default = "default_gui_inventory_path")]
    pub gui_inventory_path: Option<PathBuf>,

    /// Extra configuration for extensions
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml_ng::Value>,
}

fn default_application_path() -> PathBuf {
    PathBuf::from("/Applications/VMware Fusion.app")
}

fn default_autoresume_filename() -> String {
    DEFAULT_AUTORESUME_FILENAME.to_string()
}

fn default_directories() -> Vec<PathBuf> {
    vec![PathBuf::from("~/Virtual Machines.localized")]
}

fn default_gui_inventory_path() -> Option<PathBuf> {
    Some(PathBuf::from(
        "~/Library/Application Support/VMware Fusion/vmInventory",
    ))
}

impl Default for InventorySettings {
    fn default() -> Self {
        Self {
            application_path: default_application_path(),
            autoresume_filename: default_autoresume_filename(),
            directories: default_directories(),
            gui_inventory_path: default_gui_inventory_path(),
            extra: IndexMap::new(),
        }
    }
}

/// Expand a leading `~` to the home directory.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(raw.as_ref()).into_owned())
}

impl InventorySettings {
    /// `~/.vmx/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".vmx").join("config.yaml"))
    }

    /// Load settings from `path`, or from [`default_path`](Self::default_path).
    ///
    /// A missing file yields the defaults; an unreadable or invalid one is
    /// an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::FileAccess {
            path: path.clone(),
            source,
        })?;
        Self::from_yaml(&contents, &path)
    }

    /// Parse settings from YAML text; `path` is used for error reporting.
    pub fn from_yaml(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml_ng::from_str(contents).map_err(|e| ConfigError::Settings {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Full path of the control utility.
    pub fn vmrun_path(&self) -> PathBuf {
        expand_path(&self.application_path).join(VMRUN_RELATIVE_PATH)
    }

    pub fn expanded_directories(&self) -> Vec<PathBuf> {
        self.directories.iter().map(|d| expand_path(d)).collect()
    }

    pub fn expanded_gui_inventory_path(&self) -> Option<PathBuf> {
        self.gui_inventory_path.as_deref().map(expand_path)
    }
}
