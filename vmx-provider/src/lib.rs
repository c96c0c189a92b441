//! Guest machine inventory and lifecycle control.
//!
//! This library finds `.vmx` files in the configured directories, loads each
//! into a [`VirtualMachine`](vmx_config::VirtualMachine), and starts, stops
//! and suspends machines through a [`ControlUtility`], normally the
//! hypervisor's `vmrun` program.

pub mod error;
pub mod inventory;
pub mod lifecycle;
pub mod registry;
pub mod vmrun;

// When the `test-helpers` feature is enabled, include the mock control utility.
#[cfg(any(test, feature = "test-helpers"))]
pub mod mock;

pub use error::{ProviderError, Result};
pub use inventory::Inventory;
pub use lifecycle::MachineStatus;
pub use registry::GuiRegistry;
pub use vmrun::{ControlUtility, VmRun};
