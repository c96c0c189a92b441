//! Driving guests through the hypervisor's `vmrun` control utility.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use vmx_config::InventorySettings;
use vmx_core::file_system::is_executable;
use vmx_core::{run_captured, CommandOutput};

use crate::error::{ProviderError, Result};

/// Argument `vmrun start` takes to run a guest without a window.
const NOGUI: &str = "nogui";

/// Operations the inventory needs from the hypervisor.
pub trait ControlUtility: Send + Sync {
    /// Configuration files of every running guest.
    fn running_vms(&self) -> Result<Vec<PathBuf>>;

    fn start(&self, path: &Path, headless: bool) -> Result<()>;

    fn stop(&self, path: &Path) -> Result<()>;

    fn suspend(&self, path: &Path) -> Result<()>;
}

/// The `vmrun` program shipped inside the application bundle.
#[derive(Debug, Clone)]
pub struct VmRun {
    path: PathBuf,
}

impl VmRun {
    /// Locate `vmrun` under the configured application path.
    pub fn new(settings: &InventorySettings) -> Result<Self> {
        Self::at(settings.vmrun_path())
    }

    /// Use the program at `path`, which must be an executable file.
    pub fn at(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !is_executable(&path) {
            return Err(ProviderError::NotExecutable(path));
        }
        debug!(vmrun = %path.display(), "using control utility");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn run(&self, args: &[&OsStr]) -> Result<CommandOutput> {
        run_captured(&self.path, args)
            .map_err(|e| ProviderError::CommandFailed(format!("{}: {}", self.path.display(), e)))
    }

    fn run_checked(&self, action: &str, vmx: &Path, args: &[&OsStr]) -> Result<()> {
        let output = self.run(args)?;
        if output.success() {
            return Ok(());
        }
        Err(ProviderError::CommandFailed(format!(
            "Error {} {}: {}",
            action,
            vmx.display(),
            output.combined().trim_end()
        )))
    }
}

/// Paths listed by `vmrun list`. The first line is a count header.
fn parse_list(stdout: &str) -> Vec<PathBuf> {
    stdout
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect()
}

impl ControlUtility for VmRun {
    fn running_vms(&self) -> Result<Vec<PathBuf>> {
        let output = self.run(&[OsStr::new("list")])?;
        if !output.success() {
            return Err(ProviderError::CommandFailed(format!(
                "Error listing running machines: {}",
                output.combined().trim_end()
            )));
        }
        Ok(parse_list(&output.stdout))
    }

    fn start(&self, path: &Path, headless: bool) -> Result<()> {
        info!(vmx = %path.display(), headless, "starting");
        let mut args = vec![OsStr::new("start"), path.as_os_str()];
        if headless {
            args.push(OsStr::new(NOGUI));
        }
        self.run_checked("starting", path, &args)
    }

    fn stop(&self, path: &Path) -> Result<()> {
        info!(vmx = %path.display(), "stopping");
        self.run_checked("stopping", path, &[OsStr::new("stop"), path.as_os_str()])
    }

    fn suspend(&self, path: &Path) -> Result<()> {
        info!(vmx = %path.display(), "suspending");
        self.run_checked(
            "suspending",
            path,
            &[OsStr::new("suspend"), path.as_os_str()],
        )
    }
}
