//! Infrastructure layer for the switcher.
//!
//! Contains OS-facing adapters: the HID transport, file-system storage for
//! settings and the device cache, and the launcher for the setup tool.
//!
//! **Dependency rule**: this layer may depend on `kamels_core`; the
//! application layer reaches it only through the [`transport::HidTransport`]
//! trait and the plain data types of `storage`.

pub mod launcher;
pub mod storage;
pub mod transport;
