//! The resolved mouse/keyboard pair.

use kamels_core::{DeviceIdentity, PeripheralRole, TransportKind};

/// Identities of both peripherals, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peripherals {
    pub mouse: DeviceIdentity,
    pub keyboard: DeviceIdentity,
}

impl Peripherals {
    pub fn new(mouse: DeviceIdentity, keyboard: DeviceIdentity) -> Self {
        Self { mouse, keyboard }
    }

    pub fn get(&self, role: PeripheralRole) -> &DeviceIdentity {
        match role {
            PeripheralRole::Mouse => &self.mouse,
            PeripheralRole::Keyboard => &self.keyboard,
        }
    }

    /// Transport kind of `role`.
    pub fn transport(&self, role: PeripheralRole) -> TransportKind {
        self.get(role).transport
    }
}
