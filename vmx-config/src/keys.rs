//! Key tables for `.vmx` files.
//!
//! [`FLAT_KEYS`] maps keys that land directly on the machine to a canonical
//! field name and a coercion. The section schemas declare the leaf keys of
//! each indexed namespace.

use crate::schema::SectionSchema;
use crate::value::ValueKind;

/// A key stored directly on the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatKey {
    pub key: &'static str,
    pub field: &'static str,
    pub kind: ValueKind,
}

const fn flat(key: &'static str, field: &'static str, kind: ValueKind) -> FlatKey {
    FlatKey { key, field, kind }
}

use crate::value::ValueKind::{Boolean, Identifier, Integer, Text};

pub static FLAT_KEYS: &[FlatKey] = &[
    flat("displayName", "name", Text),
    flat("guestOS", "guest_os", Text),
    flat("annotation", "annotation", Text),
    flat("memsize", "memory", Integer),
    flat("numvcpus", "cores", Integer),
    flat("cpuid.coresPerSocket", "cores_per_socket", Integer),
    flat("uuid.bios", "uuid_bios", Identifier),
    flat("uuid.location", "uuid_location", Identifier),
    flat("config.version", "config_version", Integer),
    flat("virtualHW.version", "hardware_version", Integer),
    flat("firmware", "firmware", Text),
    flat("nvram", "nvram", Text),
    flat("extendedConfigFile", "extended_config_file", Text),
    flat("vmxstats.filename", "stats_filename", Text),
    flat("checkpoint.vmState", "vm_state_file", Text),
    flat("tools.syncTime", "tools_sync_time", Boolean),
    flat("tools.upgrade.policy", "tools_upgrade_policy", Text),
    flat("vhv.enable", "nested_virtualization", Boolean),
    flat("vpmc.enable", "performance_counters", Boolean),
    flat("sound.present", "sound", Boolean),
    flat("floppy0.present", "floppy", Boolean),
    flat("serial0.present", "serial_port", Boolean),
    flat("hgfs.linkRootShare", "hgfs_link_root_share", Boolean),
    flat("isolation.tools.hgfs.disable", "hgfs_disabled", Boolean),
    flat("gui.fullScreenAtPowerOn", "gui_fullscreen_at_power_on", Boolean),
    flat("msg.autoAnswer", "auto_answer", Boolean),
    flat("mks.enable3d", "accelerate_3d", Boolean),
    flat("svga.vramSize", "video_memory", Integer),
    flat("monitor.phys_bits_used", "physical_address_bits", Integer),
    flat("cleanShutdown", "clean_shutdown", Boolean),
    flat("softPowerOff", "soft_power_off", Boolean),
];

/// Look up a flat key. Keys are case-sensitive.
pub fn flat_key(key: &str) -> Option<&'static FlatKey> {
    FLAT_KEYS.iter().find(|flat| flat.key == key)
}

pub static INTERFACE: SectionSchema = SectionSchema::new(
    "ethernet",
    &["pciSlotNumber", "generatedAddressOffset"],
    &["present", "startConnected", "wakeOnPcktRcv"],
    &[
        ("virtualDev", "driver"),
        ("connectionType", "connection_type"),
        ("startConnected", "start_connected"),
        ("generatedAddress", "mac_address"),
        ("wakeOnPcktRcv", "wake_on_packet_receive"),
        ("addressType", "address_type"),
        ("generatedAddressOffset", "generated_address_offset"),
        ("pciSlotNumber", "pci_slot_number"),
    ],
    &[("driver", "unknown")],
);

pub static PCI_BRIDGE: SectionSchema = SectionSchema::new(
    "pciBridge",
    &["pciSlotNumber", "functions"],
    &["present"],
    &[
        ("virtualDev", "virtual_device"),
        ("pciSlotNumber", "pci_slot_number"),
    ],
    &[],
);

pub static USB_PORT: SectionSchema = SectionSchema::new(
    "usb:",
    &["parent", "speed", "port"],
    &["present"],
    &[("deviceType", "device_type")],
    &[],
);

pub static USB_BUS: SectionSchema = SectionSchema::new(
    "usb",
    &["pciSlotNumber"],
    &["present"],
    &[("pciSlotNumber", "pci_slot_number")],
    &[],
);

pub static SHARE: SectionSchema = SectionSchema::new(
    "sharedFolder",
    &[],
    &["enabled", "present", "readAccess", "writeAccess"],
    &[
        ("hostPath", "host_path"),
        ("guestName", "guest_folder_name"),
        ("readAccess", "guest_read_access"),
        ("writeAccess", "guest_write_access"),
    ],
    &[],
);

pub static SHARED_FOLDERS: SectionSchema = SectionSchema::new(
    "sharedFolder",
    &["maxNum"],
    &[],
    &[("maxNum", "max_number")],
    &[],
);

pub static VMCI: SectionSchema = SectionSchema::new(
    "vmci",
    &["pciSlotNumber"],
    &["present"],
    &[("pciSlotNumber", "pci_slot_number")],
    &[],
);
