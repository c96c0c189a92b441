//! Discovery of guest machines on disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use glob::Pattern;
use tracing::{debug, info, warn};
use vmx_config::{InventoryLookup, InventorySettings, VirtualMachine};
use walkdir::WalkDir;

use crate::error::Result;
use crate::registry::GuiRegistry;
use crate::vmrun::ControlUtility;

const VMX_EXTENSION: &str = "vmx";

/// Every machine found under the configured directories, sorted by path.
pub struct Inventory {
    settings: InventorySettings,
    control: Arc<dyn ControlUtility>,
    registry: GuiRegistry,
    machines: Vec<VirtualMachine>,
}

impl Inventory {
    /// Load the GUI registry named in `settings` and scan for machines.
    ///
    /// An unreadable registry is logged and treated as empty.
    pub fn open(settings: InventorySettings, control: Arc<dyn ControlUtility>) -> Self {
        let registry = match settings.expanded_gui_inventory_path() {
            Some(path) => GuiRegistry::load(&path).unwrap_or_else(|e| {
                warn!(error = %e, "ignoring unreadable GUI registry");
                GuiRegistry::default()
            }),
            None => GuiRegistry::default(),
        };
        Self::with_registry(settings, control, registry)
    }

    pub fn with_registry(
        settings: InventorySettings,
        control: Arc<dyn ControlUtility>,
        registry: GuiRegistry,
    ) -> Self {
        let mut inventory = Self {
            settings,
            control,
            registry,
            machines: Vec::new(),
        };
        inventory.rescan();
        inventory
    }

    /// Reload every machine from disk.
    pub fn rescan(&mut self) {
        self.machines = self.scan();
        info!(machines = self.machines.len(), "inventory scanned");
    }

    fn scan(&self) -> Vec<VirtualMachine> {
        let mut paths: Vec<PathBuf> = self
            .settings
            .expanded_directories()
            .iter()
            .flat_map(|dir| {
                WalkDir::new(dir)
                    .follow_links(true)
                    .into_iter()
                    .filter_map(|entry| match entry {
                        Ok(entry) => Some(entry),
                        Err(e) => {
                            debug!(error = %e, "skipping unreadable entry");
                            None
                        }
                    })
                    .filter(|entry| entry.file_type().is_file())
                    .filter(|entry| {
                        entry.path().extension().and_then(|e| e.to_str()) == Some(VMX_EXTENSION)
                    })
                    .map(|entry| entry.into_path())
            })
            .collect();
        paths.sort();
        paths.dedup();

        paths
            .iter()
            .filter_map(|path| match VirtualMachine::load(self, path) {
                Ok(machine) => Some(machine),
                Err(e) => {
                    warn!(error = %e, "skipping machine");
                    None
                }
            })
            .collect()
    }

    pub fn machines(&self) -> &[VirtualMachine] {
        &self.machines
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VirtualMachine> {
        self.machines.iter()
    }

    pub fn len(&self) -> usize {
        self.machines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    pub fn get(&self, path: &Path) -> Option<&VirtualMachine> {
        self.machines.iter().find(|vm| vm.path() == path)
    }

    /// Machines whose display name matches any of `patterns`.
    ///
    /// Each pattern may hold several comma-separated globs. No patterns
    /// selects every machine. Results keep the order of first match.
    pub fn match_names<S: AsRef<str>>(&self, patterns: &[S]) -> Vec<&VirtualMachine> {
        let globs: Vec<&str> = patterns
            .iter()
            .flat_map(|p| p.as_ref().split(','))
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        if globs.is_empty() {
            return self.machines.iter().collect();
        }

        let mut matched: Vec<&VirtualMachine> = Vec::new();
        for glob in globs {
            let pattern = Pattern::new(glob).ok();
            for vm in &self.machines {
                let name = vm.display_name();
                let hit = match &pattern {
                    Some(pattern) => pattern.matches(&name),
                    None => name == glob,
                };
                if hit && !matched.iter().any(|m| m.path() == vm.path()) {
                    matched.push(vm);
                }
            }
        }
        matched
    }

    pub fn running_paths(&self) -> Result<Vec<PathBuf>> {
        self.control.running_vms()
    }

    pub fn is_running(&self, vm: &VirtualMachine) -> Result<bool> {
        Ok(self.running_paths()?.iter().any(|p| p == vm.path()))
    }

    pub fn control(&self) -> &dyn ControlUtility {
        self.control.as_ref()
    }

    pub fn settings(&self) -> &InventorySettings {
        &self.settings
    }

    pub fn registry(&self) -> &GuiRegistry {
        &self.registry
    }
}

impl InventoryLookup for Inventory {
    fn autoresume_filename(&self) -> &str {
        &self.settings.autoresume_filename
    }

    fn find_vmx(&self, path: &Path) -> bool {
        self.registry.contains(path)
    }
}

impl<'a> IntoIterator for &'a Inventory {
    type Item = &'a VirtualMachine;
    type IntoIter = std::slice::Iter<'a, VirtualMachine>;

    fn into_iter(self) -> Self::IntoIter {
        self.machines.iter()
    }
}
