//! Per-peripheral connection state.
//!
//! # Connection lifecycle
//!
//! ```text
//!             probe failure / switch-off report / forwarded command
//!   Connected ─────────────────────────────────────────────────────► Disconnected
//!       ▲                                                                 │
//!       └──────────── path present again in a fresh enumeration ─────────┘
//! ```
//!
//! Both peripherals start Connected and there is no terminal state.
//!
//! The state is one `AtomicBool` per peripheral.  Watchers and the recovery
//! task share the monitor through an `Arc` and never lock anything; a reader
//! may observe a value one transition stale, which only delays a reaction by
//! one poll interval.

use std::sync::atomic::{AtomicBool, Ordering};

use kamels_core::{PeripheralRole, LOGITECH_VENDOR_ID};
use tracing::{debug, info};

use crate::application::peripherals::Peripherals;
use crate::infrastructure::transport::HidTransport;

/// Current state of one peripheral as seen from this host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Paired to this host and reachable.
    Connected,
    /// Switched away, unplugged, or unreachable.
    Disconnected,
}

/// Lock-free connection flags for the mouse and the keyboard.
#[derive(Debug)]
pub struct ConnectionMonitor {
    mouse: AtomicBool,
    keyboard: AtomicBool,
}

impl Default for ConnectionMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionMonitor {
    /// Both peripherals start Connected.
    pub fn new() -> Self {
        Self {
            mouse: AtomicBool::new(true),
            keyboard: AtomicBool::new(true),
        }
    }

    fn flag(&self, role: PeripheralRole) -> &AtomicBool {
        match role {
            PeripheralRole::Mouse => &self.mouse,
            PeripheralRole::Keyboard => &self.keyboard,
        }
    }

    pub fn state(&self, role: PeripheralRole) -> ConnectionState {
        if self.is_connected(role) {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    pub fn is_connected(&self, role: PeripheralRole) -> bool {
        self.flag(role).load(Ordering::Acquire)
    }

    /// Moves `role` to Disconnected.
    ///
    /// Returns `true` only for the caller that performed the transition, so
    /// a reaction tied to it runs once per transition even if several tasks
    /// observe the failure.
    pub fn mark_disconnected(&self, role: PeripheralRole) -> bool {
        let was_connected = self.flag(role).swap(false, Ordering::AcqRel);
        if was_connected {
            info!("{role} disconnected");
        }
        was_connected
    }

    /// Moves `role` to Connected.  Returns `true` if it was Disconnected.
    pub fn mark_connected(&self, role: PeripheralRole) -> bool {
        let was_connected = self.flag(role).swap(true, Ordering::AcqRel);
        if !was_connected {
            info!("{role} connected again");
        }
        !was_connected
    }

    /// Roles currently Disconnected, mouse first.
    pub fn disconnected_roles(&self) -> Vec<PeripheralRole> {
        PeripheralRole::ALL
            .into_iter()
            .filter(|&role| !self.is_connected(role))
            .collect()
    }

    /// One recovery pass.
    ///
    /// Re-enumerates every Disconnected peripheral by vendor and product ID
    /// and flips it back to Connected if the same interface is present under
    /// its stable path.  Nothing is forwarded.  Enumeration errors leave the
    /// state unchanged.
    ///
    /// Returns the roles that were recovered.
    pub fn recover(
        &self,
        transport: &dyn HidTransport,
        peripherals: &Peripherals,
    ) -> Vec<PeripheralRole> {
        let mut recovered = Vec::new();
        for role in self.disconnected_roles() {
            let identity = peripherals.get(role);
            let present = match transport
                .enumerate(Some(LOGITECH_VENDOR_ID), Some(identity.product_id))
            {
                Ok(found) => found.iter().any(|candidate| {
                    candidate.path == identity.path && candidate.same_interface(identity)
                }),
                Err(e) => {
                    debug!("recovery enumeration for {role} failed: {e}");
                    false
                }
            };
            if present && self.mark_connected(role) {
                recovered.push(role);
            }
        }
        recovered
    }
}
