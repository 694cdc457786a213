//! Dispatcher: turns a trigger on one peripheral into a switch command for
//! the other.
//!
//! # Triggers
//!
//! | Source transport | Trigger                                               |
//! |------------------|-------------------------------------------------------|
//! | Wired            | the role's switch-off report arrives on the receiver  |
//! | Wireless         | a probe fails while the peripheral is Connected       |
//!
//! On a trigger the *peer* is sent its "change host" command for this host's
//! destination slot.  A Wireless peer is then marked Disconnected: it is about
//! to leave, and its own watcher must not mistake that for a new trigger.
//!
//! Every method here performs blocking HID calls.  Async callers run them on
//! `tokio::task::spawn_blocking`.
//!
//! # Write then acknowledge
//!
//! Each command write is followed by one bounded read of a short report.  The
//! device answers with an acknowledgment when it accepts the request; a
//! timeout is not an error, since a device that is already switching may not
//! answer at all.

use std::sync::Arc;
use std::time::Duration;

use kamels_core::{
    build_switch_command, is_switch_off_report, PeripheralRole, TransportKind, LONG_REPORT_LEN,
    SHORT_REPORT_LEN,
};
use tracing::{debug, info, warn};

use crate::application::connection_monitor::ConnectionMonitor;
use crate::application::error::SwitchError;
use crate::application::peripherals::Peripherals;
use crate::infrastructure::transport::{HidHandle, HidTransport, TransportError};

/// Timeout of a Wireless liveness probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_millis(100);

/// Timeout of the acknowledgment read after a command write.
pub const ACK_TIMEOUT: Duration = Duration::from_millis(200);

/// Result of forwarding a command to a peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardOutcome {
    /// The command was written.
    Sent,
    /// The peer was already Disconnected; nothing was written.
    SkippedPeerDisconnected,
    /// The write failed; the peer was marked Disconnected.
    Failed(TransportError),
}

/// Result of one Wireless liveness probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The device answered or timed out quietly.
    Alive,
    /// The probe failed.  `forward` is `Some` only on the Connected to
    /// Disconnected transition.
    Lost { forward: Option<ForwardOutcome> },
    /// The peripheral is Disconnected; no probe was issued.
    NotConnected,
}

/// Sends switch commands on behalf of the watchers.
pub struct Dispatcher {
    transport: Arc<dyn HidTransport>,
    monitor: Arc<ConnectionMonitor>,
    peripherals: Peripherals,
    destination_slot: u32,
    probe_timeout: Duration,
    ack_timeout: Duration,
}

impl Dispatcher {
    pub fn new(
        transport: Arc<dyn HidTransport>,
        monitor: Arc<ConnectionMonitor>,
        peripherals: Peripherals,
        destination_slot: u32,
    ) -> Self {
        Self {
            transport,
            monitor,
            peripherals,
            destination_slot,
            probe_timeout: PROBE_TIMEOUT,
            ack_timeout: ACK_TIMEOUT,
        }
    }

    pub fn transport(&self) -> &Arc<dyn HidTransport> {
        &self.transport
    }

    pub fn monitor(&self) -> &Arc<ConnectionMonitor> {
        &self.monitor
    }

    pub fn peripherals(&self) -> &Peripherals {
        &self.peripherals
    }

    pub fn destination_slot(&self) -> u32 {
        self.destination_slot
    }

    /// Opens `role`, writes its own switch command, reads the acknowledgment.
    ///
    /// # Errors
    ///
    /// Returns the first [`TransportError`] from open, write, or the
    /// acknowledgment read.
    pub fn send_command(&self, role: PeripheralRole) -> Result<(), TransportError> {
        let mut handle = self.transport.open(self.peripherals.get(role))?;
        self.write_command(role, handle.as_mut())
    }

    fn write_command(
        &self,
        role: PeripheralRole,
        handle: &mut dyn HidHandle,
    ) -> Result<(), TransportError> {
        let identity = self.peripherals.get(role);
        let command = build_switch_command(role, identity.transport, self.destination_slot);

        handle.write(command.as_bytes())?;
        debug!("{role}: wrote {command:?}");

        let mut ack = [0u8; SHORT_REPORT_LEN];
        match handle.read(&mut ack, Some(self.ack_timeout))? {
            0 => debug!("{role}: no acknowledgment within {:?}", self.ack_timeout),
            n => debug!("{role}: acknowledgment {:02X?}", &ack[..n]),
        }
        Ok(())
    }

    /// Sends `target` its switch command unless it is already Disconnected.
    ///
    /// Errors are absorbed: the target is marked Disconnected so the recovery
    /// pass re-validates it.
    pub fn forward_to(&self, target: PeripheralRole) -> ForwardOutcome {
        if !self.monitor.is_connected(target) {
            debug!("{target} already disconnected, nothing to forward");
            return ForwardOutcome::SkippedPeerDisconnected;
        }

        match self.send_command(target) {
            Ok(()) => {
                info!("sent {target} to host slot {}", self.destination_slot);
                if self.peripherals.transport(target) == TransportKind::Wireless {
                    self.monitor.mark_disconnected(target);
                }
                ForwardOutcome::Sent
            }
            Err(e) => {
                warn!("could not switch {target}: {e}");
                self.monitor.mark_disconnected(target);
                ForwardOutcome::Failed(e)
            }
        }
    }

    /// Inspects one report read from a Wired `source`.
    ///
    /// Returns `None` unless `report` is the source's switch-off pattern.  On
    /// a match the source is marked Disconnected and the peer is forwarded
    /// its command.
    pub fn handle_report(&self, source: PeripheralRole, report: &[u8]) -> Option<ForwardOutcome> {
        if !is_switch_off_report(source, report) {
            return None;
        }
        info!("{source} switched to another host");
        self.monitor.mark_disconnected(source);
        Some(self.forward_to(source.peer()))
    }

    /// Probes a Wireless `role` with one bounded read.
    pub fn probe_wireless(&self, role: PeripheralRole) -> ProbeOutcome {
        if !self.monitor.is_connected(role) {
            return ProbeOutcome::NotConnected;
        }

        let identity = self.peripherals.get(role);
        let mut buf = [0u8; LONG_REPORT_LEN];
        let result = self
            .transport
            .open(identity)
            .and_then(|mut handle| handle.read(&mut buf, Some(self.probe_timeout)));

        match result {
            Ok(_) => ProbeOutcome::Alive,
            Err(e) => {
                debug!("{role} probe failed: {e}");
                let forward = self
                    .monitor
                    .mark_disconnected(role)
                    .then(|| self.forward_to(role.peer()));
                ProbeOutcome::Lost { forward }
            }
        }
    }

    /// One-shot mode: sends both peripherals their own command, mouse first.
    ///
    /// Both interfaces are opened before anything is written, so an
    /// unreachable peripheral leaves the pair on this host together.
    ///
    /// # Errors
    ///
    /// Returns [`SwitchError::Transport`] for the first peripheral that
    /// could not be opened or switched.
    pub fn switch_both(&self) -> Result<(), SwitchError> {
        let mut mouse = self.transport.open(&self.peripherals.mouse)?;
        let mut keyboard = self.transport.open(&self.peripherals.keyboard)?;

        for (role, handle) in [
            (PeripheralRole::Mouse, &mut mouse),
            (PeripheralRole::Keyboard, &mut keyboard),
        ] {
            self.write_command(role, handle.as_mut())?;
            info!("sent {role} to host slot {}", self.destination_slot);
        }
        Ok(())
    }
}
