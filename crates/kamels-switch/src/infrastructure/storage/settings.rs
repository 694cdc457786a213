//! Settings file (`settings.toml`).
//!
//! Six flat keys, named as the setup tool has always named them:
//!
//! ```toml
//! # This is a configuration file that keeps your settings. Please edit with care.
//!
//! mouseDevice = 45077
//! keyboardDevice = 45083
//! totalHostDevices = 3
//! hostDeviceSequenceNumber = 1
//! syncMode = 4
//! switchSpeedRate = "Shorter"
//! ```
//!
//! `0` (or a missing key) means "not configured"; so does
//! `switchSpeedRate = "None"`.  Any unset field makes [`Settings::setup_needed`]
//! true.  Hand-edited values out of range are reset to unset by
//! [`Settings::clear_invalid`] before the setup tool runs its steps.

use std::path::{Path, PathBuf};

use kamels_core::{SwitchSpeed, SyncMode, MAX_HOSTS, MIN_HOSTS};
use serde::{Deserialize, Serialize};

use super::{read_toml, write_toml, StorageError};

/// File name inside the config directory.
pub const SETTINGS_FILE: &str = "settings.toml";

const SETTINGS_HEADER: &str =
    "# This is a configuration file that keeps your settings. Please edit with care.";

/// Raw persisted settings.
///
/// Values are stored as entered; range validation happens when the switcher
/// builds its run configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// USB product ID of the mouse interface.
    #[serde(default)]
    pub mouse_device: u16,
    /// USB product ID of the keyboard interface.
    #[serde(default)]
    pub keyboard_device: u16,
    /// Number of hosts in the rotation.
    #[serde(default)]
    pub total_host_devices: u16,
    /// This host's 1-based position in the rotation.
    #[serde(default)]
    pub host_device_sequence_number: u16,
    /// Sync mode code, see [`kamels_core::SyncMode::from_code`].
    #[serde(default)]
    pub sync_mode: u16,
    /// Poll interval of the background watchers.
    #[serde(default)]
    pub switch_speed_rate: SwitchSpeed,
}

impl Settings {
    /// `true` when any field is still unset.
    pub fn setup_needed(&self) -> bool {
        !(self.keyboard_device > 0
            && self.mouse_device > 0
            && self.total_host_devices > 0
            && self.host_device_sequence_number > 0
            && self.sync_mode > 0
            && self.switch_speed_rate != SwitchSpeed::None)
    }

    /// Resets every out-of-range value to unset so the setup tool asks for it
    /// again.  A position is reset together with an invalid host count.
    ///
    /// Returns the keys that were reset.
    pub fn clear_invalid(&mut self) -> Vec<&'static str> {
        let mut cleared = Vec::new();
        let total = self.total_host_devices;
        let total_invalid = total != 0 && !(MIN_HOSTS..=MAX_HOSTS).contains(&total);
        if total_invalid {
            self.total_host_devices = 0;
            cleared.push("totalHostDevices");
        }
        let position = self.host_device_sequence_number;
        if position != 0 && (total_invalid || (total != 0 && position > total)) {
            self.host_device_sequence_number = 0;
            cleared.push("hostDeviceSequenceNumber");
        }
        if self.sync_mode != 0 && SyncMode::from_code(self.sync_mode).is_none() {
            self.sync_mode = 0;
            cleared.push("syncMode");
        }
        cleared
    }
}

/// Reads and writes [`Settings`] at a fixed path.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// A store for `settings.toml` inside `config_dir`.
    pub fn in_dir(config_dir: &Path) -> Self {
        Self {
            path: config_dir.join(SETTINGS_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the settings, returning all-unset settings if the file does not
    /// exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] or [`StorageError::Parse`].
    pub fn load(&self) -> Result<Settings, StorageError> {
        Ok(read_toml(&self.path)?.unwrap_or_default())
    }

    /// Persists `settings`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] or [`StorageError::Serialize`].
    pub fn save(&self, settings: &Settings) -> Result<(), StorageError> {
        write_toml(&self.path, SETTINGS_HEADER, settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn complete() -> Settings {
        Settings {
            mouse_device: 0xB030,
            keyboard_device: 0xB033,
            total_host_devices: 3,
            host_device_sequence_number: 1,
            sync_mode: 4,
            switch_speed_rate: SwitchSpeed::Shorter,
        }
    }

    #[test]
    fn test_default_settings_need_setup() {
        assert!(Settings::default().setup_needed());
    }

    #[test]
    fn test_complete_settings_do_not_need_setup() {
        assert!(!complete().setup_needed());
    }

    #[test]
    fn test_each_unset_field_requires_setup() {
        let cases: [fn(&mut Settings); 6] = [
            |s: &mut Settings| s.mouse_device = 0,
            |s: &mut Settings| s.keyboard_device = 0,
            |s: &mut Settings| s.total_host_devices = 0,
            |s: &mut Settings| s.host_device_sequence_number = 0,
            |s: &mut Settings| s.sync_mode = 0,
            |s: &mut Settings| s.switch_speed_rate = SwitchSpeed::None,
        ];
        for unset in cases {
            let mut settings = complete();
            unset(&mut settings);
            assert!(settings.setup_needed(), "{settings:?}");
        }
    }

    #[test]
    fn test_clear_invalid_resets_out_of_range_values() {
        // Arrange
        let mut settings = complete();
        settings.total_host_devices = 5;
        settings.host_device_sequence_number = 2;
        settings.sync_mode = 9;

        // Act
        let cleared = settings.clear_invalid();

        // Assert
        assert_eq!(
            cleared,
            vec!["totalHostDevices", "hostDeviceSequenceNumber", "syncMode"]
        );
        assert_eq!(settings.total_host_devices, 0);
        assert_eq!(settings.host_device_sequence_number, 0);
        assert_eq!(settings.sync_mode, 0);
        assert_eq!(settings.mouse_device, 0xB030);
        assert!(settings.setup_needed());
    }

    #[test]
    fn test_clear_invalid_resets_position_beyond_host_count() {
        let mut settings = complete();
        settings.total_host_devices = 2;
        settings.host_device_sequence_number = 3;
        assert_eq!(settings.clear_invalid(), vec!["hostDeviceSequenceNumber"]);
        assert_eq!(settings.total_host_devices, 2);
    }

    #[test]
    fn test_clear_invalid_keeps_valid_and_unset_values() {
        let mut settings = complete();
        assert!(settings.clear_invalid().is_empty());
        assert_eq!(settings, complete());

        let mut unset = Settings::default();
        assert!(unset.clear_invalid().is_empty());
        assert_eq!(unset, Settings::default());

        let mut partial = Settings {
            host_device_sequence_number: 2,
            ..Settings::default()
        };
        assert!(partial.clear_invalid().is_empty());
        assert_eq!(partial.host_device_sequence_number, 2);
    }

    #[test]
    fn test_keys_use_camel_case_names() {
        let text = toml::to_string(&complete()).expect("serialize");
        for key in [
            "mouseDevice",
            "keyboardDevice",
            "totalHostDevices",
            "hostDeviceSequenceNumber",
            "syncMode",
            "switchSpeedRate",
        ] {
            assert!(text.contains(key), "missing {key} in {text}");
        }
        assert!(text.contains(r#"switchSpeedRate = "Shorter""#));
    }

    #[test]
    fn test_partial_file_leaves_missing_keys_unset() {
        // Arrange
        let text = "mouseDevice = 45104\nsyncMode = 2\n";

        // Act
        let settings: Settings = toml::from_str(text).expect("deserialize");

        // Assert
        assert_eq!(settings.mouse_device, 45104);
        assert_eq!(settings.sync_mode, 2);
        assert_eq!(settings.total_host_devices, 0);
        assert_eq!(settings.switch_speed_rate, SwitchSpeed::None);
        assert!(settings.setup_needed());
    }

    #[test]
    fn test_store_load_returns_default_when_absent() {
        let dir = std::env::temp_dir().join(format!("kamels_settings_{}", Uuid::new_v4()));
        let store = SettingsStore::in_dir(&dir);
        assert_eq!(store.load().expect("load"), Settings::default());
    }

    #[test]
    fn test_store_save_and_load_round_trip() {
        // Arrange
        let dir = std::env::temp_dir().join(format!("kamels_settings_{}", Uuid::new_v4()));
        let store = SettingsStore::in_dir(&dir);

        // Act
        store.save(&complete()).expect("save");
        let loaded = store.load().expect("load");

        // Assert
        assert_eq!(loaded, complete());
        assert!(store.path().ends_with(SETTINGS_FILE));
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.starts_with("# This is a configuration file"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
