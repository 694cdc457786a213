//! Peripheral identity: which device is which, and how it is attached.
//!
//! A single Logitech receiver or Bluetooth device exposes several HID
//! interfaces (keyboard boot interface, consumer controls, vendor channel…).
//! Only one of them accepts the vendor "change host" command.  That interface
//! is selected by its HID *usage page* and *usage*, which must be one of the
//! pairs in [`ALLOWED_INTERFACES`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Logitech USB vendor ID (1133 decimal).
pub const LOGITECH_VENDOR_ID: u16 = 0x046D;

/// Which half of the keyboard/mouse pair a value refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeripheralRole {
    Mouse,
    Keyboard,
}

impl PeripheralRole {
    /// Both roles, mouse first.
    pub const ALL: [PeripheralRole; 2] = [PeripheralRole::Mouse, PeripheralRole::Keyboard];

    /// Returns the other half of the pair.
    pub fn peer(self) -> Self {
        match self {
            PeripheralRole::Mouse => PeripheralRole::Keyboard,
            PeripheralRole::Keyboard => PeripheralRole::Mouse,
        }
    }
}

impl fmt::Display for PeripheralRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeripheralRole::Mouse => f.write_str("mouse"),
            PeripheralRole::Keyboard => f.write_str("keyboard"),
        }
    }
}

/// How a peripheral is attached to this host.
///
/// - `Wired`: through a Logi Bolt / Unifying USB receiver.  The receiver stays
///   present when the peripheral switches away, so it can be block-read and
///   reports the switch explicitly.
/// - `Wireless`: directly over Bluetooth.  The HID interface disappears when
///   the peripheral switches away, so it must be probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Wired,
    Wireless,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Wired => f.write_str("USB receiver"),
            TransportKind::Wireless => f.write_str("Bluetooth"),
        }
    }
}

/// A HID (usage page, usage) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InterfaceUsage {
    pub usage_page: u16,
    pub usage: u16,
}

/// Interfaces that accept the switch command.
///
/// - `(0xFF00, 0x0001)`: vendor channel of a USB receiver.
/// - `(0xFF43, 0x0202)`: vendor channel of a Bluetooth peripheral.
pub const ALLOWED_INTERFACES: [InterfaceUsage; 2] = [
    InterfaceUsage {
        usage_page: 65280,
        usage: 1,
    },
    InterfaceUsage {
        usage_page: 65347,
        usage: 514,
    },
];

/// Everything needed to find and reopen one HID interface.
///
/// Resolved once at startup, either from live enumeration or from the
/// persisted device cache, and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub vendor_id: u16,
    pub product_id: u16,
    pub usage_page: u16,
    pub usage: u16,
    pub transport: TransportKind,
    /// Platform device path (`/dev/hidraw3`, `\\?\HID#VID_046D…`, `IOService:/…`).
    pub path: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub product: String,
}

impl DeviceIdentity {
    /// Returns the interface usage pair of this identity.
    pub fn interface_usage(&self) -> InterfaceUsage {
        InterfaceUsage {
            usage_page: self.usage_page,
            usage: self.usage,
        }
    }

    /// `true` if this identity is one of the allow-listed vendor interfaces.
    pub fn is_allowed_interface(&self) -> bool {
        ALLOWED_INTERFACES.contains(&self.interface_usage())
    }

    /// `true` if both identities denote the same logical interface.
    ///
    /// Vendor, product, usage page and usage must all match, and the shared
    /// usage pair must be allow-listed.  The path is deliberately ignored: it
    /// changes when a device is re-plugged into another port.
    pub fn same_interface(&self, other: &DeviceIdentity) -> bool {
        self.vendor_id == other.vendor_id
            && self.product_id == other.product_id
            && self.usage_page == other.usage_page
            && self.usage == other.usage
            && self.is_allowed_interface()
    }
}

/// Picks the switchable interface for `product_id` out of an enumeration.
///
/// Tie-break rule: **first allow-listed match in enumeration order wins**.
/// Ties are not expected, because a physical device exposes at most one
/// allow-listed interface, but the rule is explicit so the outcome does not
/// depend on how the caller happens to iterate.
pub fn first_matching_interface<I>(candidates: I, product_id: u16) -> Option<DeviceIdentity>
where
    I: IntoIterator<Item = DeviceIdentity>,
{
    candidates.into_iter().find(|candidate| {
        candidate.vendor_id == LOGITECH_VENDOR_ID
            && candidate.product_id == product_id
            && candidate.is_allowed_interface()
    })
}
