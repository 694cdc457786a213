//! Run configuration.
//!
//! [`SwitchConfig`] is built once at startup from the raw settings file and
//! then handed by value to the components that need it.  Nothing reads the
//! settings file after this point, and nothing looks fields up by name.
//!
//! Building it is also the configuration gate: without a valid
//! [`RotationConfig`] there is no destination slot, so no switch command can
//! ever be constructed.

use std::time::Duration;

use kamels_core::{PeripheralRole, RotationConfig, SwitchSpeed, SyncMode};

use crate::application::error::SwitchError;
use crate::infrastructure::storage::settings::Settings;

/// Validated, immutable configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchConfig {
    pub mouse_product_id: u16,
    pub keyboard_product_id: u16,
    pub rotation: RotationConfig,
    pub sync_mode: SyncMode,
    /// Interval of wireless probes and of the recovery pass.
    pub poll_interval: Duration,
}

impl SwitchConfig {
    /// Validates `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`SwitchError::ConfigIncomplete`] naming the first unset or
    /// invalid field.
    pub fn from_settings(settings: &Settings) -> Result<Self, SwitchError> {
        if settings.mouse_device == 0 {
            return Err(incomplete("mouseDevice is not set"));
        }
        if settings.keyboard_device == 0 {
            return Err(incomplete("keyboardDevice is not set"));
        }

        let rotation = RotationConfig::new(
            settings.total_host_devices,
            settings.host_device_sequence_number,
        )
        .map_err(|e| incomplete(e.to_string()))?;

        let sync_mode = SyncMode::from_code(settings.sync_mode).ok_or_else(|| {
            incomplete(format!("syncMode {} is not one of 1-4", settings.sync_mode))
        })?;

        let poll_interval = match settings.switch_speed_rate {
            SwitchSpeed::None => return Err(incomplete("switchSpeedRate is not set")),
            speed => Duration::from_millis(speed.millis()),
        };

        Ok(Self {
            mouse_product_id: settings.mouse_device,
            keyboard_product_id: settings.keyboard_device,
            rotation,
            sync_mode,
            poll_interval,
        })
    }

    /// Configured product ID of `role`.
    pub fn product_id(&self, role: PeripheralRole) -> u16 {
        match role {
            PeripheralRole::Mouse => self.mouse_product_id,
            PeripheralRole::Keyboard => self.keyboard_product_id,
        }
    }
}

fn incomplete(reason: impl Into<String>) -> SwitchError {
    SwitchError::ConfigIncomplete(reason.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            mouse_device: 0xB030,
            keyboard_device: 0xB033,
            total_host_devices: 3,
            host_device_sequence_number: 3,
            sync_mode: 4,
            switch_speed_rate: SwitchSpeed::Short,
        }
    }

    #[test]
    fn test_complete_settings_build_config() {
        // Arrange / Act
        let cfg = SwitchConfig::from_settings(&settings()).expect("valid");

        // Assert
        assert_eq!(cfg.mouse_product_id, 0xB030);
        assert_eq!(cfg.keyboard_product_id, 0xB033);
        assert_eq!(cfg.rotation.destination_slot(), 0);
        assert_eq!(cfg.sync_mode, SyncMode::Either);
        assert_eq!(cfg.poll_interval, Duration::from_millis(250));
        assert_eq!(cfg.product_id(PeripheralRole::Keyboard), 0xB033);
    }

    #[test]
    fn test_zero_total_hosts_is_incomplete() {
        let mut s = settings();
        s.total_host_devices = 0;
        assert!(matches!(
            SwitchConfig::from_settings(&s),
            Err(SwitchError::ConfigIncomplete(_))
        ));
    }

    #[test]
    fn test_position_beyond_total_is_incomplete() {
        let mut s = settings();
        s.host_device_sequence_number = 4;
        assert!(matches!(
            SwitchConfig::from_settings(&s),
            Err(SwitchError::ConfigIncomplete(_))
        ));
    }

    #[test]
    fn test_unknown_sync_mode_is_incomplete() {
        let mut s = settings();
        s.sync_mode = 9;
        match SwitchConfig::from_settings(&s) {
            Err(SwitchError::ConfigIncomplete(reason)) => assert!(reason.contains("syncMode 9")),
            other => panic!("expected ConfigIncomplete, got {other:?}"),
        }
    }

    #[test]
    fn test_unset_devices_and_speed_are_incomplete() {
        for mutate in [
            (|s: &mut Settings| s.mouse_device = 0) as fn(&mut Settings),
            |s: &mut Settings| s.keyboard_device = 0,
            |s: &mut Settings| s.switch_speed_rate = SwitchSpeed::None,
        ] {
            let mut s = settings();
            mutate(&mut s);
            assert!(SwitchConfig::from_settings(&s).is_err(), "{s:?}");
        }
    }
}
