//! KAMELS switcher library.
//!
//! Keeps a Logitech multi-host mouse and keyboard on the same host: when one
//! of them is switched away (by its Easy-Switch button or by a key bound to
//! the one-shot mode), the other is sent the matching "change host" command.
//!
//! The binary in `main.rs` wires the pieces together; the library split
//! exists so integration tests and the setup tool can reuse them.

pub mod application;
pub mod infrastructure;
