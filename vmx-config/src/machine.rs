//! The parsed guest machine.

// Standard library
use std::path::{Path, PathBuf};

// External crates
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, trace, warn};
use vmx_core::file_system;

// Internal imports
use crate::entry::SectionIndex;
use crate::error::{ConfigError, ValueError};
use crate::keys::{self, FLAT_KEYS};
use crate::parser::{ConfigFileParser, ConfigSink, Disposition};
use crate::router::{self, Route, Target};
use crate::section::{
    IndexedCollection, Interface, PciBridge, Section, SetOutcome, SharedFolders, UsbBus, Vmci,
};
use crate::settings::DEFAULT_AUTORESUME_FILENAME;
use crate::value::Value;

/// Escape sequence `.vmx` files use for a line break inside a value.
pub const LINE_BREAK_ESCAPE: &str = "|0A";

/// What a machine needs from the inventory that owns it.
pub trait InventoryLookup {
    /// File name of the autoresume marker inside a machine directory.
    fn autoresume_filename(&self) -> &str;

    /// Whether the GUI application has this configuration file registered.
    fn find_vmx(&self, path: &Path) -> bool;
}

/// Lookup for machines loaded outside any inventory: default marker name,
/// nothing registered with the GUI.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInventory;

impl InventoryLookup for NoInventory {
    fn autoresume_filename(&self) -> &str {
        DEFAULT_AUTORESUME_FILENAME
    }

    fn find_vmx(&self, _path: &Path) -> bool {
        false
    }
}

/// A guest machine parsed from its `.vmx` file.
///
/// Every flat key in [`FLAT_KEYS`] has a scalar slot from the start:
/// integer keys hold `0` and the rest are empty until the file sets them.
/// Equality compares attributes and collection membership, not the order
/// lines appeared in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VirtualMachine {
    path: PathBuf,
    headless: bool,
    autoresume_filename: String,
    scalars: IndexMap<&'static str, Option<Value>>,
    extras: IndexMap<String, String>,
    interfaces: IndexedCollection<Interface>,
    pci_bridges: IndexedCollection<PciBridge>,
    vmci_interfaces: IndexedCollection<Vmci>,
    shared_folders: SharedFolders,
    usb: UsbBus,
}

impl VirtualMachine {
    fn empty(path: PathBuf, inventory: &dyn InventoryLookup) -> Self {
        let scalars = FLAT_KEYS
            .iter()
            .map(|flat| (flat.field, flat.kind.default_value()))
            .collect();

        Self {
            headless: !inventory.find_vmx(&path),
            autoresume_filename: inventory.autoresume_filename().to_string(),
            path,
            scalars,
            extras: IndexMap::new(),
            interfaces: IndexedCollection::new(),
            pci_bridges: IndexedCollection::new(),
            vmci_interfaces: IndexedCollection::new(),
            shared_folders: SharedFolders::new(SectionIndex::default()),
            usb: UsbBus::new(SectionIndex::default()),
        }
    }

    /// Load and parse the configuration file at `path`.
    ///
    /// Nothing is returned unless the whole file parsed.
    pub fn load(
        inventory: &dyn InventoryLookup,
        path: impl AsRef<Path>,
    ) -> Result<Self, ConfigError> {
        let parser = ConfigFileParser::new(path.as_ref());
        let mut machine = Self::empty(parser.path().to_path_buf(), inventory);
        parser.load(&mut machine)?;
        debug!(
            path = %machine.path.display(),
            interfaces = machine.interfaces.len(),
            shares = machine.shared_folders.shares().len(),
            "loaded machine"
        );
        Ok(machine)
    }

    /// Parse `contents` as if read from `path`.
    pub fn parse_str(
        inventory: &dyn InventoryLookup,
        path: impl AsRef<Path>,
        contents: &str,
    ) -> Result<Self, ConfigError> {
        let parser = ConfigFileParser::new(path.as_ref());
        let mut machine = Self::empty(parser.path().to_path_buf(), inventory);
        parser.parse_str(contents, &mut machine)?;
        Ok(machine)
    }

    fn set_section(
        &mut self,
        target: Target,
        index: SectionIndex,
        rest: &[&str],
        value: &str,
    ) -> Result<SetOutcome, ValueError> {
        match target {
            Target::UsbBus => self.usb.set(rest, value),
            Target::Vmci => self.vmci_interfaces.find_or_insert(index).set(rest, value),
            Target::Interface => self.interfaces.find_or_insert(index).set(rest, value),
            Target::PciBridge => self.pci_bridges.find_or_insert(index).set(rest, value),
            Target::UsbPort => self.usb.ports_mut().find_or_insert(index).set(rest, value),
            Target::SharedFolders => {
                let outcome = self.shared_folders.set_count(value);
                if self.shared_folders.count().is_none() {
                    warn!(
                        path = %self.path.display(),
                        value = %value,
                        "shared folder count is not an integer"
                    );
                }
                Ok(outcome)
            }
            Target::Share => self
                .shared_folders
                .shares_mut()
                .find_or_insert(index)
                .set(rest, value),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the configuration file.
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Not registered with the GUI application, so only controllable
    /// through the control utility.
    pub fn headless(&self) -> bool {
        self.headless
    }

    pub fn autoresume_file(&self) -> PathBuf {
        self.directory().join(&self.autoresume_filename)
    }

    /// Whether the autoresume marker exists.
    pub fn autoresume(&self) -> bool {
        file_system::has_file(self.directory(), &self.autoresume_filename)
    }

    /// Whether the directory holds a memory image, which for a machine that
    /// is not running means it is suspended.
    pub fn has_vmem(&self) -> bool {
        file_system::has_file_with_extension(self.directory(), "vmem")
    }

    /// Scalar attribute by canonical field name. `None` both for unknown
    /// fields and for declared fields the file did not set.
    pub fn scalar(&self, field: &str) -> Option<&Value> {
        self.scalars.get(field).and_then(Option::as_ref)
    }

    /// Every declared scalar slot, in declaration order.
    pub fn scalars(&self) -> impl Iterator<Item = (&'static str, Option<&Value>)> {
        self.scalars.iter().map(|(k, v)| (*k, v.as_ref()))
    }

    fn text(&self, field: &str) -> Option<&str> {
        self.scalar(field).and_then(Value::as_str)
    }

    fn integer(&self, field: &str) -> i64 {
        self.scalar(field).and_then(Value::as_integer).unwrap_or(0)
    }

    pub fn name(&self) -> Option<&str> {
        self.text("name")
    }

    /// `displayName`, or the file stem when the file has none.
    pub fn display_name(&self) -> String {
        match self.name() {
            Some(name) => name.to_string(),
            None => self
                .path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }

    pub fn guest_os(&self) -> Option<&str> {
        self.text("guest_os")
    }

    /// Memory size in megabytes.
    pub fn memory(&self) -> i64 {
        self.integer("memory")
    }

    pub fn cores(&self) -> i64 {
        self.integer("cores")
    }

    pub fn annotation(&self) -> Option<&str> {
        self.text("annotation")
    }

    pub fn uuid_bios(&self) -> Option<&str> {
        self.text("uuid_bios")
    }

    pub fn uuid_location(&self) -> Option<&str> {
        self.text("uuid_location")
    }

    /// Stable identifier: the location UUID, else the BIOS UUID.
    pub fn uuid(&self) -> Option<&str> {
        self.uuid_location().or_else(|| self.uuid_bios())
    }

    /// The annotation with escaped line breaks expanded.
    pub fn description(&self) -> String {
        self.annotation()
            .map(|text| text.replace(LINE_BREAK_ESCAPE, "\n"))
            .unwrap_or_default()
    }

    /// Value of a key nothing recognized, stored under the literal key.
    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extras.get(key).map(String::as_str)
    }

    pub fn extras(&self) -> impl Iterator<Item = (&str, &str)> {
        self.extras.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn interfaces(&self) -> &IndexedCollection<Interface> {
        &self.interfaces
    }

    pub fn interface(&self, index: u64) -> Option<&Interface> {
        self.interfaces.get(index)
    }

    pub fn pci_bridges(&self) -> &IndexedCollection<PciBridge> {
        &self.pci_bridges
    }

    pub fn vmci_interfaces(&self) -> &IndexedCollection<Vmci> {
        &self.vmci_interfaces
    }

    pub fn shared_folders(&self) -> &SharedFolders {
        &self.shared_folders
    }

    pub fn usb(&self) -> &UsbBus {
        &self.usb
    }
}

impl ConfigSink for VirtualMachine {
    fn parse_value(&mut self, key: &str, value: &str) -> Result<Disposition, ValueError> {
        if let Some(flat) = keys::flat_key(key) {
            let coerced = flat.kind.coerce(key, value)?;
            trace!(key = %key, field = flat.field, value = %coerced, "set machine attribute");
            self.scalars.insert(flat.field, Some(coerced));
            return Ok(Disposition::Handled);
        }

        match router::route(key) {
            Route::Section {
                target,
                index,
                rest,
            } => {
                let outcome = self
                    .set_section(target, index.clone(), &rest, value)
                    .map_err(|err| ValueError::new(key, err.value))?;
                match outcome {
                    SetOutcome::Applied { key: field, value } => {
                        trace!(key = %key, ?target, index = %index, field = %field, value = %value, "set section attribute");
                    }
                    SetOutcome::Nested { parts, .. } => {
                        trace!(key = %key, ?target, index = %index, ?parts, "ignoring nested section key");
                    }
                }
                Ok(Disposition::Handled)
            }
            Route::BadIndex { target, segment } => {
                warn!(
                    path = %self.path.display(),
                    key = %key,
                    ?target,
                    segment = %segment,
                    "skipping key with non-numeric index"
                );
                Ok(Disposition::Handled)
            }
            Route::Unrouted => Ok(Disposition::Unhandled),
        }
    }

    fn store_unhandled(&mut self, key: &str, value: &str) {
        self.extras.insert(key.to_string(), value.to_string());
    }
}
