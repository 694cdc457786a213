//! Domain entities for KAMELS.
//!
//! This module contains pure business logic with no infrastructure dependencies.
//!
//! # What is "domain" in Clean Architecture? (for beginners)
//!
//! The innermost layer of the application.  Domain code has **no** imports
//! from HID libraries, file systems, or async runtimes, and can be tested on
//! any machine without a mouse or keyboard attached.  Outer layers (the
//! switcher's watchers, the setup wizard) depend on it; it never depends on
//! them.

/// Peripheral roles, transport kinds, and HID interface identity.
pub mod peripheral;

/// Host rotation: how many hosts, where this one sits, where to switch to.
pub mod rotation;

/// Sync modes and poll intervals.
pub mod sync;
