//! Builder for the vendor "change host" command.
//!
//! Wire format:
//! ```text
//! [report_id:1][device_index:1][feature_index:1][function|sw_id:1][slot:LE…][pad…]
//! ```
//!
//! The four prefix bytes depend on the peripheral role (mouse and keyboard
//! expose the change-host feature at different feature indices and occupy
//! different receiver slots) and on the transport (short report through a
//! receiver, long report over Bluetooth).
//!
//! The destination slot is encoded little-endian as 32 bits and the whole
//! sequence is fitted to the report length: a short report keeps the first
//! three slot bytes, a long report is zero-padded to 20 bytes.  Slots never
//! exceed 3, so the short form drops only zero bytes.

use std::fmt;

use crate::domain::peripheral::{PeripheralRole, TransportKind};
use crate::protocol::report::{LONG_REPORT_LEN, SHORT_REPORT_LEN};

const MOUSE_WIRED_PREFIX: [u8; 4] = [0x10, 0x02, 0x0A, 0x1E];
const MOUSE_WIRELESS_PREFIX: [u8; 4] = [0x11, 0x00, 0x0A, 0x1C];
const KEYBOARD_WIRED_PREFIX: [u8; 4] = [0x10, 0x01, 0x09, 0x16];
const KEYBOARD_WIRELESS_PREFIX: [u8; 4] = [0x11, 0x00, 0x09, 0x1C];

/// A ready-to-write switch command.
///
/// Built fresh for every write and consumed by it; never cached.
#[derive(Clone, PartialEq, Eq)]
pub struct SwitchCommand(Vec<u8>);

impl SwitchCommand {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl fmt::Debug for SwitchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SwitchCommand[")?;
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02X}")?;
        }
        f.write_str("]")
    }
}

/// Fixed prefix for a role/transport combination.
pub fn command_prefix(role: PeripheralRole, transport: TransportKind) -> [u8; 4] {
    match (role, transport) {
        (PeripheralRole::Mouse, TransportKind::Wired) => MOUSE_WIRED_PREFIX,
        (PeripheralRole::Mouse, TransportKind::Wireless) => MOUSE_WIRELESS_PREFIX,
        (PeripheralRole::Keyboard, TransportKind::Wired) => KEYBOARD_WIRED_PREFIX,
        (PeripheralRole::Keyboard, TransportKind::Wireless) => KEYBOARD_WIRELESS_PREFIX,
    }
}

/// Report length the device expects on `transport`.
pub fn report_len(transport: TransportKind) -> usize {
    match transport {
        TransportKind::Wired => SHORT_REPORT_LEN,
        TransportKind::Wireless => LONG_REPORT_LEN,
    }
}

/// Builds the command that sends `role` to rotation slot `destination_slot`.
///
/// Pure and total: the same inputs always yield the same bytes.
///
/// # Examples
///
/// ```rust
/// use kamels_core::{build_switch_command, PeripheralRole, TransportKind};
///
/// let cmd = build_switch_command(PeripheralRole::Mouse, TransportKind::Wired, 0);
/// assert_eq!(cmd.as_bytes(), &[0x10, 0x02, 0x0A, 0x1E, 0x00, 0x00, 0x00]);
/// ```
pub fn build_switch_command(
    role: PeripheralRole,
    transport: TransportKind,
    destination_slot: u32,
) -> SwitchCommand {
    let len = report_len(transport);
    let mut buf = Vec::with_capacity(LONG_REPORT_LEN.max(len));
    buf.extend_from_slice(&command_prefix(role, transport));
    buf.extend_from_slice(&destination_slot.to_le_bytes());
    buf.resize(len, 0x00);
    SwitchCommand(buf)
}
