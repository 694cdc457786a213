//! Application layer of the switcher.
//!
//! # What lives here? (for beginners)
//!
//! The domain crate (`kamels_core`) knows *what* a switch command looks like.
//! The infrastructure layer knows *how* to talk to a HID device.  This layer
//! decides *when* to do it:
//!
//! - **`config`** – validates the settings file into an immutable
//!   [`config::SwitchConfig`].  No command can be built without it.
//! - **`bootstrap`** – resolves the mouse and keyboard identities, live first,
//!   then from the device cache.
//! - **`connection_monitor`** – one atomic flag per peripheral plus the
//!   recovery pass that flips Disconnected peripherals back to Connected.
//! - **`dispatch`** – reacts to a trigger on one peripheral by sending the
//!   other one its switch command.
//! - **`watchers`** – the long-running async tasks that produce triggers.
//! - **`orchestrator`** – runs the one-shot switch or spawns the watchers and
//!   waits for them.
//!
//! Everything here talks to hardware only through the
//! [`HidTransport`](crate::infrastructure::transport::HidTransport) trait, so
//! the whole layer runs against `MockTransport` in tests.

pub mod bootstrap;
pub mod config;
pub mod connection_monitor;
pub mod dispatch;
pub mod error;
pub mod orchestrator;
pub mod peripherals;
pub mod watchers;
