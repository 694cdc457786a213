//! Error taxonomy of the switcher.
//!
//! | Variant            | Effect on the process                                  |
//! |--------------------|--------------------------------------------------------|
//! | `ConfigIncomplete` | switching is skipped, the setup tool is launched       |
//! | `DeviceUnresolved` | a diagnostic is printed and the run ends               |
//! | `Transport`        | only escapes from one-shot mode; watchers absorb it    |
//! | `Storage`          | settings or cache file unreadable                      |
//!
//! Unknown or unsupported vendor protocol versions are not detected: a device
//! that ignores the switch command looks exactly like one that obeyed it.

use kamels_core::PeripheralRole;
use thiserror::Error;

use crate::infrastructure::storage::StorageError;
use crate::infrastructure::transport::TransportError;

#[derive(Debug, Error)]
pub enum SwitchError {
    /// One or more required settings are unset or out of range.
    #[error("configuration incomplete: {0}")]
    ConfigIncomplete(String),

    /// Neither live enumeration nor the device cache yielded an identity.
    #[error("could not find the {role}; it is neither connected nor remembered from setup")]
    DeviceUnresolved { role: PeripheralRole },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A blocking HID task panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
