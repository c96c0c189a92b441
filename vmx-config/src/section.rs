//! Typed configuration sections.
//!
//! A section is a [`ConfigEntry`] plus a static [`SectionSchema`]. Sections
//! receive the dot-path left over after routing (`ethernet0.virtualDev`
//! arrives as `["virtualDev"]`) and coerce the value per their schema.

use crate::entry::{ConfigEntry, SectionIndex};
use crate::error::ValueError;
use crate::keys;
use crate::schema::SectionSchema;
use crate::value::Value;
use serde::Serialize;

/// What [`Section::set`] did with a path and value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetOutcome {
    /// The leaf was stored under `key`.
    Applied { key: String, value: Value },
    /// More than one segment remained; nothing was stored.
    Nested { parts: Vec<String>, value: String },
}

pub trait Section: Sized {
    fn schema() -> &'static SectionSchema;
    fn from_entry(entry: ConfigEntry) -> Self;
    fn entry(&self) -> &ConfigEntry;
    fn entry_mut(&mut self) -> &mut ConfigEntry;

    /// New section with the schema's defaults applied.
    fn new(index: SectionIndex) -> Self {
        let mut entry = ConfigEntry::new(index);
        for (name, value) in Self::schema().defaults {
            entry.set(*name, Value::Text(value.to_string()));
        }
        Self::from_entry(entry)
    }

    fn index(&self) -> &SectionIndex {
        self.entry().index()
    }

    fn attribute(&self, name: &str) -> Option<&Value> {
        self.entry().get(name)
    }

    /// Apply the remaining dot-path segments and raw value.
    ///
    /// Only a single leaf segment is stored. Deeper paths describe nested
    /// concepts this model does not track and come back as
    /// [`SetOutcome::Nested`].
    fn set(&mut self, parts: &[&str], value: &str) -> Result<SetOutcome, ValueError> {
        let [leaf] = parts else {
            return Ok(SetOutcome::Nested {
                parts: parts.iter().map(|p| p.to_string()).collect(),
                value: value.to_string(),
            });
        };

        let (field, coerced) = Self::schema().apply(leaf, value)?;
        self.entry_mut().set(field, coerced.clone());
        Ok(SetOutcome::Applied {
            key: field.to_string(),
            value: coerced,
        })
    }
}

/// Sections of one type, in first-seen order, unique by index.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct IndexedCollection<T> {
    items: Vec<T>,
}

impl<T> Default for IndexedCollection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Section> IndexedCollection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The section with `index`, appended if this is its first reference.
    pub fn find_or_insert(&mut self, index: SectionIndex) -> &mut T {
        let pos = match self.items.iter().position(|item| *item.index() == index) {
            Some(pos) => pos,
            None => {
                self.items.push(T::new(index));
                self.items.len() - 1
            }
        };
        &mut self.items[pos]
    }

    pub fn get(&self, index: u64) -> Option<&T> {
        self.get_index(&SectionIndex::new(index))
    }

    /// Lookup for any index, including those beyond `u64`.
    pub fn get_index(&self, index: &SectionIndex) -> Option<&T> {
        self.items.iter().find(|item| item.index() == index)
    }

    pub fn indices(&self) -> Vec<SectionIndex> {
        self.items.iter().map(|item| item.index().clone()).collect()
    }
}

impl<T> IndexedCollection<T> {
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Membership comparison: same indices with equal sections, in any order.
impl<T: Section + PartialEq> PartialEq for IndexedCollection<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .items
                .iter()
                .all(|item| other.get_index(item.index()) == Some(item))
    }
}

impl<T: Section + Eq> Eq for IndexedCollection<T> {}

impl<'a, T> IntoIterator for &'a IndexedCollection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

macro_rules! typed_section {
    ($(#[$meta:meta])* $name:ident, $schema:path) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
        pub struct $name {
            #[serde(flatten)]
            entry: ConfigEntry,
        }

        impl Section for $name {
            fn schema() -> &'static SectionSchema {
                &$schema
            }

            fn from_entry(entry: ConfigEntry) -> Self {
                Self { entry }
            }

            fn entry(&self) -> &ConfigEntry {
                &self.entry
            }

            fn entry_mut(&mut self) -> &mut ConfigEntry {
                &mut self.entry
            }
        }
    };
}

typed_section!(
    /// Ethernet network interface (`ethernet<N>.*`).
    Interface,
    keys::INTERFACE
);

impl Interface {
    pub fn present(&self) -> bool {
        self.entry.flag("present")
    }

    /// Connected at power on. Only an explicit `TRUE` counts.
    pub fn autoconnect(&self) -> bool {
        self.entry.flag("start_connected")
    }

    pub fn driver(&self) -> &str {
        self.entry.text("driver").unwrap_or("unknown")
    }

    pub fn connection_type(&self) -> Option<&str> {
        self.entry.text("connection_type")
    }

    pub fn mac_address(&self) -> Option<&str> {
        self.entry.text("mac_address")
    }

    pub fn address_type(&self) -> Option<&str> {
        self.entry.text("address_type")
    }

    pub fn pci_slot_number(&self) -> Option<i64> {
        self.entry.integer("pci_slot_number")
    }

    pub fn generated_address_offset(&self) -> Option<i64> {
        self.entry.integer("generated_address_offset")
    }

    pub fn wake_on_packet_receive(&self) -> bool {
        self.entry.flag("wake_on_packet_receive")
    }
}

typed_section!(
    /// PCI bridge (`pciBridge<N>.*`).
    PciBridge,
    keys::PCI_BRIDGE
);

impl PciBridge {
    pub fn present(&self) -> bool {
        self.entry.flag("present")
    }

    pub fn virtual_device(&self) -> Option<&str> {
        self.entry.text("virtual_device")
    }

    pub fn pci_slot_number(&self) -> Option<i64> {
        self.entry.integer("pci_slot_number")
    }

    pub fn functions(&self) -> Option<i64> {
        self.entry.integer("functions")
    }
}

typed_section!(
    /// Device attached to a USB port (`usb:<N>.*`).
    UsbPort,
    keys::USB_PORT
);

impl UsbPort {
    pub fn present(&self) -> bool {
        self.entry.flag("present")
    }

    pub fn device_type(&self) -> Option<&str> {
        self.entry.text("device_type")
    }

    pub fn parent(&self) -> Option<i64> {
        self.entry.integer("parent")
    }

    pub fn port(&self) -> Option<i64> {
        self.entry.integer("port")
    }

    pub fn speed(&self) -> Option<i64> {
        self.entry.integer("speed")
    }
}

typed_section!(
    /// Host folder mapped into the guest (`sharedFolder<N>.*`).
    Share,
    keys::SHARE
);

impl Share {
    pub fn present(&self) -> bool {
        self.entry.flag("present")
    }

    pub fn enabled(&self) -> bool {
        self.entry.flag("enabled")
    }

    pub fn host_path(&self) -> Option<&str> {
        self.entry.text("host_path")
    }

    pub fn guest_folder_name(&self) -> Option<&str> {
        self.entry.text("guest_folder_name")
    }

    pub fn guest_read_access(&self) -> bool {
        self.entry.flag("guest_read_access")
    }

    pub fn guest_write_access(&self) -> bool {
        self.entry.flag("guest_write_access")
    }
}

typed_section!(
    /// VMCI channel (`vmci<N>.*`).
    Vmci,
    keys::VMCI
);

impl Vmci {
    pub fn present(&self) -> bool {
        self.entry.flag("present")
    }

    pub fn pci_slot_number(&self) -> Option<i64> {
        self.entry.integer("pci_slot_number")
    }
}

/// USB controller (`usb.*`) and the ports hanging off it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsbBus {
    #[serde(flatten)]
    entry: ConfigEntry,
    ports: IndexedCollection<UsbPort>,
}

impl Section for UsbBus {
    fn schema() -> &'static SectionSchema {
        &keys::USB_BUS
    }

    fn from_entry(entry: ConfigEntry) -> Self {
        Self {
            entry,
            ports: IndexedCollection::new(),
        }
    }

    fn entry(&self) -> &ConfigEntry {
        &self.entry
    }

    fn entry_mut(&mut self) -> &mut ConfigEntry {
        &mut self.entry
    }
}

impl UsbBus {
    pub fn present(&self) -> bool {
        self.entry.flag("present")
    }

    pub fn pci_slot_number(&self) -> Option<i64> {
        self.entry.integer("pci_slot_number")
    }

    pub fn ports(&self) -> &IndexedCollection<UsbPort> {
        &self.ports
    }

    pub fn ports_mut(&mut self) -> &mut IndexedCollection<UsbPort> {
        &mut self.ports
    }
}

/// Shared folder settings (`sharedFolder.*`) and the shares themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharedFolders {
    #[serde(flatten)]
    entry: ConfigEntry,
    shares: IndexedCollection<Share>,
}

impl Section for SharedFolders {
    fn schema() -> &'static SectionSchema {
        &keys::SHARED_FOLDERS
    }

    fn from_entry(entry: ConfigEntry) -> Self {
        Self {
            entry,
            shares: IndexedCollection::new(),
        }
    }

    fn entry(&self) -> &ConfigEntry {
        &self.entry
    }

    fn entry_mut(&mut self) -> &mut ConfigEntry {
        &mut self.entry
    }
}

const COUNT_KEY: &str = "maxNum";

impl SharedFolders {
    /// Store `sharedFolder.maxNum`. A value that is not an integer is kept
    /// as text instead of failing the file.
    pub fn set_count(&mut self, raw: &str) -> SetOutcome {
        let (field, value) = match Self::schema().apply(COUNT_KEY, raw) {
            Ok(applied) => applied,
            Err(_) => (
                Self::schema().field_name(COUNT_KEY),
                Value::Text(raw.to_string()),
            ),
        };
        self.entry.set(field, value.clone());
        SetOutcome::Applied {
            key: field.to_string(),
            value,
        }
    }

    /// Declared number of shared folder slots (`sharedFolder.maxNum`).
    pub fn count(&self) -> Option<i64> {
        self.entry.integer("max_number")
    }

    /// `sharedFolder.maxNum` as written, integer or not.
    pub fn max_number(&self) -> Option<&Value> {
        self.entry.get("max_number")
    }

    pub fn shares(&self) -> &IndexedCollection<Share> {
        &self.shares
    }

    pub fn shares_mut(&mut self) -> &mut IndexedCollection<Share> {
        &mut self.shares
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interface_defaults() {
        let iface = Interface::new(SectionIndex::new(0));
        assert_eq!(iface.driver(), "unknown");
        assert!(!iface.autoconnect());
        assert!(!iface.present());
        assert_eq!(iface.mac_address(), None);
    }

    #[test]
    fn test_set_leaf_applies_schema() {
        let mut iface = Interface::new(SectionIndex::new(0));
        let outcome = iface.set(&["virtualDev"], "vmxnet3").unwrap();
        assert_eq!(
            outcome,
            SetOutcome::Applied {
                key: "driver".to_string(),
                value: Value::Text("vmxnet3".to_string())
            }
        );
        iface.set(&["startConnected"], "TRUE").unwrap();
        iface.set(&["pciSlotNumber"], "160").unwrap();
        iface.set(&["linkStatePropagation"], "enable").unwrap();

        assert_eq!(iface.driver(), "vmxnet3");
        assert!(iface.autoconnect());
        assert_eq!(iface.pci_slot_number(), Some(160));
        assert_eq!(
            iface.attribute("linkStatePropagation"),
            Some(&Value::Text("enable".to_string()))
        );
    }

    #[test]
    fn test_autoconnect_requires_exact_marker() {
        let mut iface = Interface::new(SectionIndex::new(1));
        iface.set(&["startConnected"], "true").unwrap();
        assert!(!iface.autoconnect());
    }

    #[test]
    fn test_set_nested_path_is_returned_unchanged() {
        let mut bus = UsbBus::new(SectionIndex::new(0));
        let outcome = bus.set(&["generic", "autoconnect"], "FALSE").unwrap();
        assert_eq!(
            outcome,
            SetOutcome::Nested {
                parts: vec!["generic".to_string(), "autoconnect".to_string()],
                value: "FALSE".to_string()
            }
        );
        assert!(bus.entry().is_empty());

        let outcome = bus.set(&[], "x").unwrap();
        assert!(matches!(outcome, SetOutcome::Nested { .. }));
    }

    #[test]
    fn test_set_rejects_non_numeric_integer() {
        let mut port = UsbPort::new(SectionIndex::new(0));
        let err = port.set(&["speed"], "fast").unwrap_err();
        assert_eq!(err, ValueError::new("speed", "fast"));
        assert!(port.entry().is_empty());
    }

    #[test]
    fn test_find_or_insert_is_idempotent() {
        let mut interfaces: IndexedCollection<Interface> = IndexedCollection::new();
        interfaces.find_or_insert(SectionIndex::new(5)).set(&["present"], "TRUE").unwrap();
        interfaces.find_or_insert(SectionIndex::new(0)).set(&["present"], "TRUE").unwrap();
        interfaces
            .find_or_insert(SectionIndex::new(5))
            .set(&["virtualDev"], "e1000")
            .unwrap();

        assert_eq!(interfaces.len(), 2);
        assert_eq!(
            interfaces.indices(),
            vec![SectionIndex::new(5), SectionIndex::new(0)]
        );
        let five = interfaces.get(5).unwrap();
        assert!(five.present());
        assert_eq!(five.driver(), "e1000");
        assert!(interfaces.get(3).is_none());
    }

    #[test]
    fn test_collection_equality_ignores_order() {
        let mut a: IndexedCollection<Vmci> = IndexedCollection::new();
        a.find_or_insert(SectionIndex::new(0)).set(&["present"], "TRUE").unwrap();
        a.find_or_insert(SectionIndex::new(1));

        let mut b: IndexedCollection<Vmci> = IndexedCollection::new();
        b.find_or_insert(SectionIndex::new(1));
        b.find_or_insert(SectionIndex::new(0)).set(&["present"], "TRUE").unwrap();
        assert_eq!(a, b);

        b.find_or_insert(SectionIndex::new(0)).set(&["pciSlotNumber"], "35").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_shared_folders_count_and_shares() {
        let mut folders = SharedFolders::new(SectionIndex::new(0));
        folders.set(&["maxNum"], "2").unwrap();
        let share = folders.shares_mut().find_or_insert(SectionIndex::new(0));
        share.set(&["hostPath"], "/Users/dev/src").unwrap();
        share.set(&["writeAccess"], "TRUE").unwrap();

        assert_eq!(folders.count(), Some(2));
        let share = folders.shares().get(0).unwrap();
        assert_eq!(share.host_path(), Some("/Users/dev/src"));
        assert!(share.guest_write_access());
        assert!(!share.guest_read_access());
    }

    #[test]
    fn test_unparsable_count_is_kept_as_text() {
        let mut folders = SharedFolders::new(SectionIndex::default());
        let outcome = folders.set_count("n/a");
        assert_eq!(
            outcome,
            SetOutcome::Applied {
                key: "max_number".to_string(),
                value: Value::Text("n/a".to_string())
            }
        );
        assert_eq!(folders.count(), None);
        assert_eq!(folders.max_number(), Some(&Value::Text("n/a".to_string())));

        folders.set_count("4");
        assert_eq!(folders.count(), Some(4));
    }
}
