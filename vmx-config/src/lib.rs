//! Parser and structured model for `.vmx` guest configuration files.
//!
//! A `.vmx` file is a flat list of `key = "value"` lines whose keys are
//! dot-namespaced (`ethernet0.virtualDev`, `sharedFolder3.hostPath`). This
//! crate turns that list into a [`VirtualMachine`]: flat keys become typed
//! scalar attributes, namespaced keys are routed into indexed sections
//! (network interfaces, PCI bridges, USB ports, shared folders, VMCI
//! channels), and anything unrecognized is kept verbatim.
//!
//! ## Main Features
//! - Line parser with a pluggable [`ConfigSink`] hook
//! - Data-driven key tables and namespace routing
//! - Inventory settings loaded from YAML

pub mod entry;
pub mod error;
pub mod keys;
pub mod machine;
pub mod parser;
pub mod router;
pub mod schema;
pub mod section;
pub mod settings;
pub mod value;

pub use entry::{ConfigEntry, SectionIndex};
pub use error::{ConfigError, ValueError};
pub use machine::{InventoryLookup, NoInventory, VirtualMachine};
pub use parser::{ConfigFileParser, ConfigSink, Disposition};
pub use section::{
    IndexedCollection, Interface, PciBridge, Section, SetOutcome, Share, SharedFolders, UsbBus,
    UsbPort, Vmci,
};
pub use settings::InventorySettings;
pub use value::{Value, ValueKind};
