//! # kamels-core
//!
//! Shared library for KAMELS (Keyboard And Mouse Enumerative Logitech Switch)
//! containing the peripheral domain model and the switch-command tables.
//!
//! This crate is used by both the switcher and the setup applications.
//! It has zero dependencies on OS APIs, HID libraries, or file systems.
//!
//! # Architecture overview (for beginners)
//!
//! A multi-host Logitech mouse and keyboard can each be paired to up to three
//! computers ("hosts") and switched between them with a button on the device.
//! Normally the two peripherals switch independently.  KAMELS keeps them in
//! step: when one of them leaves this host, the other is told to follow it to
//! the next host in a fixed rotation.
//!
//! This crate (`kamels-core`) is the shared foundation.  It defines:
//!
//! - **`domain`** – Pure types with no OS dependencies: which peripheral is
//!   which ([`PeripheralRole`]), how it is attached ([`TransportKind`]), the
//!   identity of a HID interface ([`DeviceIdentity`]), the host rotation
//!   ([`RotationConfig`]), and the sync behaviour ([`SyncMode`]).
//!
//! - **`protocol`** – The bytes that travel to and from the device: the
//!   vendor "change host" command and the report a peripheral emits when its
//!   own switch button is pressed.

pub mod domain;
pub mod protocol;

pub use domain::peripheral::{
    first_matching_interface, DeviceIdentity, InterfaceUsage, PeripheralRole, TransportKind,
    ALLOWED_INTERFACES, LOGITECH_VENDOR_ID,
};
pub use domain::rotation::{RotationConfig, RotationError, MAX_HOSTS, MIN_HOSTS};
pub use domain::sync::{SwitchSpeed, SyncMode};
pub use protocol::command::{build_switch_command, SwitchCommand};
pub use protocol::report::{is_switch_off_report, switch_off_pattern, LONG_REPORT_LEN, SHORT_REPORT_LEN};
