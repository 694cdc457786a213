//! HID++ report sizes and the switch-off notification.
//!
//! Logitech's vendor protocol (HID++) uses two fixed report lengths:
//!
//! ```text
//! short  [0x10][device][feature][function|sw_id][p0][p1][p2]          7 bytes
//! long   [0x11][device][feature][function|sw_id][p0 … p15]           20 bytes
//! ```
//!
//! When the user presses the host-switch button of a peripheral attached
//! through a USB receiver, the receiver emits a short report announcing that
//! the link to this host is going down.  The bytes differ per device slot on
//! the receiver, so each role has its own pattern.

use crate::domain::peripheral::PeripheralRole;

/// Length of a HID++ short report, report ID included.
pub const SHORT_REPORT_LEN: usize = 7;
/// Length of a HID++ long report, report ID included.
pub const LONG_REPORT_LEN: usize = 20;

const KEYBOARD_SWITCH_OFF: [u8; SHORT_REPORT_LEN] = [0x10, 0x01, 0x41, 0x10, 0x41, 0x65, 0xB3];
const MOUSE_SWITCH_OFF: [u8; SHORT_REPORT_LEN] = [0x10, 0x02, 0x41, 0x10, 0x42, 0x30, 0xB0];

/// The report a receiver emits when `role` switches away from this host.
pub fn switch_off_pattern(role: PeripheralRole) -> &'static [u8; SHORT_REPORT_LEN] {
    match role {
        PeripheralRole::Keyboard => &KEYBOARD_SWITCH_OFF,
        PeripheralRole::Mouse => &MOUSE_SWITCH_OFF,
    }
}

/// `true` if `report` is exactly the switch-off pattern of `role`.
pub fn is_switch_off_report(role: PeripheralRole, report: &[u8]) -> bool {
    report == switch_off_pattern(role).as_slice()
}
