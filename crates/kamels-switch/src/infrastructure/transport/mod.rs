//! HID transport infrastructure.
//!
//! The switcher needs only four things from the operating system's HID
//! stack: list interfaces, open one by path, read a report, write a report.
//! Those are captured by the [`HidTransport`] and [`HidHandle`] traits.
//!
//! - [`hidapi_transport::HidApiTransport`] implements them on top of the
//!   `hidapi` crate (hidraw on Linux, IOKit on macOS, HID.dll on Windows).
//! - [`mock::MockTransport`] is an in-memory fake with scripted reads and
//!   recorded writes, used by unit and integration tests.
//!
//! Every call may block, so async callers run them on
//! `tokio::task::spawn_blocking`.

use std::time::Duration;

use kamels_core::DeviceIdentity;
use thiserror::Error;

pub mod hidapi_transport;
pub mod mock;

/// Error type for HID transport operations.
///
/// Inside the watchers these are connectivity signals, not failures: they are
/// logged and folded into the peripheral's connection state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The HID library could not be initialised.
    #[error("failed to initialise HID library: {0}")]
    Init(String),
    /// Listing devices failed.
    #[error("failed to enumerate HID devices: {0}")]
    Enumerate(String),
    /// The device path could not be opened (absent, busy, or no permission).
    #[error("failed to open {path}: {reason}")]
    Open { path: String, reason: String },
    /// A report read failed, usually because the device went away.
    #[error("failed to read from {path}: {reason}")]
    Read { path: String, reason: String },
    /// A report write failed or was rejected.
    #[error("failed to write to {path}: {reason}")]
    Write { path: String, reason: String },
}

/// Enumerate-and-open half of the transport.
#[cfg_attr(test, mockall::automock)]
pub trait HidTransport: Send + Sync {
    /// Lists HID interfaces, optionally filtered by vendor and product ID.
    ///
    /// The enumeration is fresh on every call.
    fn enumerate(
        &self,
        vendor_id: Option<u16>,
        product_id: Option<u16>,
    ) -> Result<Vec<DeviceIdentity>, TransportError>;

    /// Opens the interface at `identity.path`.
    fn open(&self, identity: &DeviceIdentity) -> Result<Box<dyn HidHandle>, TransportError>;
}

/// An open HID interface.  Dropping the handle closes it.
pub trait HidHandle: Send {
    /// Reads one input report into `buf`.
    ///
    /// `None` blocks until a report arrives.  With a timeout, `Ok(0)` means no
    /// report arrived in time.
    fn read(&mut self, buf: &mut [u8], timeout: Option<Duration>) -> Result<usize, TransportError>;

    /// Writes one output report; `data[0]` is the report ID.
    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError>;
}
