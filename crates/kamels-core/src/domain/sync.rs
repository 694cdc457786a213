//! Sync modes and poll intervals.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::peripheral::PeripheralRole;

/// Which peripheral drives the other.
///
/// The numeric codes are the values stored in the settings file and shown in
/// the setup prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncMode {
    /// `1`: run once, switch both peripherals, exit.  Meant to be bound to a
    /// key on the keyboard so a single press rotates the whole pair.
    KeyboardTriggersRotation,
    /// `2`: watch the keyboard; the mouse follows it.
    MouseFollowsKeyboard,
    /// `3`: watch the mouse; the keyboard follows it.
    KeyboardFollowsMouse,
    /// `4`: watch both; whichever switches first takes the other along.
    Either,
}

impl SyncMode {
    /// All modes in code order.
    pub const ALL: [SyncMode; 4] = [
        SyncMode::KeyboardTriggersRotation,
        SyncMode::MouseFollowsKeyboard,
        SyncMode::KeyboardFollowsMouse,
        SyncMode::Either,
    ];

    /// Decodes a settings value.  `0` and unknown codes yield `None`.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(SyncMode::KeyboardTriggersRotation),
            2 => Some(SyncMode::MouseFollowsKeyboard),
            3 => Some(SyncMode::KeyboardFollowsMouse),
            4 => Some(SyncMode::Either),
            _ => None,
        }
    }

    /// The value stored in the settings file.
    pub fn code(self) -> u16 {
        match self {
            SyncMode::KeyboardTriggersRotation => 1,
            SyncMode::MouseFollowsKeyboard => 2,
            SyncMode::KeyboardFollowsMouse => 3,
            SyncMode::Either => 4,
        }
    }

    /// `true` for the run-once mode.
    pub fn is_one_shot(self) -> bool {
        matches!(self, SyncMode::KeyboardTriggersRotation)
    }

    /// `true` if a watcher task must run for `role` in this mode.
    pub fn watches(self, role: PeripheralRole) -> bool {
        match self {
            SyncMode::KeyboardTriggersRotation => false,
            SyncMode::MouseFollowsKeyboard => role == PeripheralRole::Keyboard,
            SyncMode::KeyboardFollowsMouse => role == PeripheralRole::Mouse,
            SyncMode::Either => true,
        }
    }

    /// Short human description used by the setup prompt.
    pub fn description(self) -> &'static str {
        match self {
            SyncMode::KeyboardTriggersRotation => {
                "Mouse follows keyboard (via sequence-toggle function bound to key press)"
            }
            SyncMode::MouseFollowsKeyboard => "Mouse follows keyboard",
            SyncMode::KeyboardFollowsMouse => {
                "Keyboard follows mouse (this program needs to run in the background)"
            }
            SyncMode::Either => "Either (this program needs to run in the background)",
        }
    }
}

/// Poll interval of the background watchers.
///
/// Serialized by variant name.  `None` means "not configured yet".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SwitchSpeed {
    #[default]
    None,
    Shortest,
    Shorter,
    Short,
    Normal,
    Long,
}

impl SwitchSpeed {
    /// Default offered first by the setup prompt.
    pub const DEFAULT: SwitchSpeed = SwitchSpeed::Shorter;

    /// Every configured speed, shortest first.
    pub const CONFIGURED: [SwitchSpeed; 5] = [
        SwitchSpeed::Shortest,
        SwitchSpeed::Shorter,
        SwitchSpeed::Short,
        SwitchSpeed::Normal,
        SwitchSpeed::Long,
    ];

    pub fn millis(self) -> u64 {
        match self {
            SwitchSpeed::None => 0,
            SwitchSpeed::Shortest => 10,
            SwitchSpeed::Shorter => 100,
            SwitchSpeed::Short => 250,
            SwitchSpeed::Normal => 500,
            SwitchSpeed::Long => 1000,
        }
    }

    /// Poll interval, or `None` when unset.
    pub fn interval(self) -> Option<Duration> {
        match self {
            SwitchSpeed::None => None,
            other => Some(Duration::from_millis(other.millis())),
        }
    }
}

impl fmt::Display for SwitchSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
