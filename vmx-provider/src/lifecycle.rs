//! Starting, stopping and suspending machines.
//!
//! Each action checks whether the guest is running first and does nothing
//! when it is already in the requested state. Actions report whether they
//! did anything.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::{debug, info};
use vmx_config::VirtualMachine;

use crate::error::Result;
use crate::inventory::Inventory;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineStatus {
    Running,
    /// Not running, with a memory image on disk.
    Suspended,
    Stopped,
}

impl fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Running => "running",
            Self::Suspended => "suspended",
            Self::Stopped => "stopped",
        };
        f.write_str(label)
    }
}

/// Create the autoresume marker next to `vm`'s configuration file.
fn write_marker(vm: &VirtualMachine) -> Result<()> {
    fs::write(vm.autoresume_file(), b"\n")?;
    Ok(())
}

/// Remove the autoresume marker. A marker that is already gone is fine.
fn remove_marker(vm: &VirtualMachine) -> Result<()> {
    match fs::remove_file(vm.autoresume_file()) {
        Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
        _ => Ok(()),
    }
}

/// Marker failures never fail the action that caused them.
fn log_marker_failure(vm: &VirtualMachine, result: Result<()>) {
    if let Err(e) = result {
        debug!(
            marker = %vm.autoresume_file().display(),
            error = %e,
            "autoresume marker not updated"
        );
    }
}

impl Inventory {
    pub fn status(&self, vm: &VirtualMachine) -> Result<MachineStatus> {
        if self.is_running(vm)? {
            Ok(MachineStatus::Running)
        } else if vm.has_vmem() {
            Ok(MachineStatus::Suspended)
        } else {
            Ok(MachineStatus::Stopped)
        }
    }

    /// Start `vm`, headless unless `headless` says otherwise. `None` uses
    /// whether the GUI knows the machine.
    pub fn start(&self, vm: &VirtualMachine, headless: Option<bool>) -> Result<bool> {
        if self.is_running(vm)? {
            debug!(vm = %vm.display_name(), "already running");
            return Ok(false);
        }
        let headless = headless.unwrap_or_else(|| vm.headless());
        info!(vm = %vm.display_name(), headless, "start");
        self.control().start(vm.path(), headless)?;
        log_marker_failure(vm, remove_marker(vm));
        Ok(true)
    }

    pub fn stop(&self, vm: &VirtualMachine) -> Result<bool> {
        if !self.is_running(vm)? {
            debug!(vm = %vm.display_name(), "not running");
            return Ok(false);
        }
        info!(vm = %vm.display_name(), "stop");
        self.control().stop(vm.path())?;
        Ok(true)
    }

    /// Suspend `vm`. With `autoresume`, a headless machine gets a marker so
    /// [`resume_all`](Self::resume_all) brings it back.
    pub fn suspend(&self, vm: &VirtualMachine, autoresume: bool) -> Result<bool> {
        if !self.is_running(vm)? {
            debug!(vm = %vm.display_name(), "not running");
            return Ok(false);
        }
        info!(vm = %vm.display_name(), autoresume, "suspend");
        self.control().suspend(vm.path())?;
        if autoresume && vm.headless() {
            log_marker_failure(vm, write_marker(vm));
        }
        Ok(true)
    }

    /// Start every stopped headless machine carrying an autoresume marker.
    /// Returns the paths started.
    pub fn resume_all(&self) -> Result<Vec<PathBuf>> {
        self.resume_matching::<&str>(&[])
    }

    /// [`resume_all`](Self::resume_all) limited to machines whose display
    /// name matches `patterns`, as in [`match_names`](Self::match_names).
    pub fn resume_matching<S: AsRef<str>>(&self, patterns: &[S]) -> Result<Vec<PathBuf>> {
        let running = self.running_paths()?;
        let mut resumed = Vec::new();
        for vm in self.match_names(patterns) {
            if !vm.headless() || !vm.autoresume() {
                continue;
            }
            if running.iter().any(|p| p == vm.path()) {
                continue;
            }
            info!(vm = %vm.display_name(), "resume");
            self.control().start(vm.path(), true)?;
            log_marker_failure(vm, remove_marker(vm));
            resumed.push(vm.path().to_path_buf());
        }
        Ok(resumed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use tempfile::TempDir;
    use vmx_config::NoInventory;

    #[test]
    fn test_status_display() {
        assert_eq!(MachineStatus::Running.to_string(), "running");
        assert_eq!(MachineStatus::Suspended.to_string(), "suspended");
        assert_eq!(MachineStatus::Stopped.to_string(), "stopped");
    }

    #[test]
    fn test_marker_io_reports_errors() {
        let temp_dir = TempDir::new().unwrap();
        let vm_path = temp_dir.path().join("guest.vmwarevm").join("guest.vmx");
        let vm = VirtualMachine::parse_str(&NoInventory, &vm_path, "").unwrap();

        // The machine directory does not exist, so the marker cannot be written.
        assert!(matches!(write_marker(&vm), Err(ProviderError::IoError(_))));
        assert!(remove_marker(&vm).is_ok());

        fs::create_dir_all(vm.directory()).unwrap();
        write_marker(&vm).unwrap();
        assert!(vm.autoresume());
        remove_marker(&vm).unwrap();
        assert!(!vm.autoresume());
        assert!(remove_marker(&vm).is_ok());
    }
}
