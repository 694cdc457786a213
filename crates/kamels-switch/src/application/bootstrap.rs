//! Startup device resolution.
//!
//! For each peripheral the configured product ID is looked up:
//!
//! 1. **Live**: enumerate Logitech interfaces with that product ID and take
//!    the first allow-listed one in enumeration order.
//! 2. **Cache**: otherwise use the identity remembered in `devices.toml`, if
//!    its vendor and product ID still match the settings.
//!
//! A Bluetooth peripheral currently paired to another host does not enumerate
//! at all, which is why the cache exists.  If neither source has an identity
//! the run fails with [`SwitchError::DeviceUnresolved`].

use kamels_core::{first_matching_interface, DeviceIdentity, PeripheralRole, LOGITECH_VENDOR_ID};
use tracing::{info, warn};

use crate::application::config::SwitchConfig;
use crate::application::error::SwitchError;
use crate::application::peripherals::Peripherals;
use crate::infrastructure::storage::device_cache::DeviceCache;
use crate::infrastructure::transport::HidTransport;

/// Where an identity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    Live,
    Cache,
}

/// Both identities plus their provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPeripherals {
    pub peripherals: Peripherals,
    pub mouse_source: IdentitySource,
    pub keyboard_source: IdentitySource,
}

impl ResolvedPeripherals {
    pub fn source(&self, role: PeripheralRole) -> IdentitySource {
        match role {
            PeripheralRole::Mouse => self.mouse_source,
            PeripheralRole::Keyboard => self.keyboard_source,
        }
    }

    /// `true` when both identities came from live enumeration.
    pub fn all_live(&self) -> bool {
        self.mouse_source == IdentitySource::Live && self.keyboard_source == IdentitySource::Live
    }

    /// Writes both identities into `cache`.
    pub fn remember_in(&self, cache: &mut DeviceCache) {
        for role in PeripheralRole::ALL {
            cache.set(role, self.peripherals.get(role).clone());
        }
    }
}

/// Resolves the mouse and the keyboard.
///
/// # Errors
///
/// Returns [`SwitchError::DeviceUnresolved`] for the first peripheral (mouse
/// first) found neither live nor in the cache.
pub fn resolve_peripherals(
    transport: &dyn HidTransport,
    config: &SwitchConfig,
    cache: &DeviceCache,
) -> Result<ResolvedPeripherals, SwitchError> {
    let (mouse, mouse_source) = resolve_one(transport, config, cache, PeripheralRole::Mouse)?;
    let (keyboard, keyboard_source) =
        resolve_one(transport, config, cache, PeripheralRole::Keyboard)?;

    Ok(ResolvedPeripherals {
        peripherals: Peripherals::new(mouse, keyboard),
        mouse_source,
        keyboard_source,
    })
}

fn resolve_one(
    transport: &dyn HidTransport,
    config: &SwitchConfig,
    cache: &DeviceCache,
    role: PeripheralRole,
) -> Result<(DeviceIdentity, IdentitySource), SwitchError> {
    let product_id = config.product_id(role);

    let live = match transport.enumerate(Some(LOGITECH_VENDOR_ID), Some(product_id)) {
        Ok(found) => first_matching_interface(found, product_id),
        Err(e) => {
            warn!("enumeration for {role} failed, trying device cache: {e}");
            None
        }
    };
    if let Some(identity) = live {
        info!(
            "{role}: {} {} over {} at {}",
            identity.manufacturer, identity.product, identity.transport, identity.path
        );
        return Ok((identity, IdentitySource::Live));
    }

    match cache
        .get(role)
        .filter(|cached| cached.vendor_id == LOGITECH_VENDOR_ID && cached.product_id == product_id)
    {
        Some(identity) => {
            info!(
                "{role} not present, using remembered {} at {}",
                identity.transport, identity.path
            );
            Ok((identity.clone(), IdentitySource::Cache))
        }
        None => Err(SwitchError::DeviceUnresolved { role }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::settings::Settings;
    use crate::infrastructure::transport::{MockHidTransport, TransportError};
    use kamels_core::{SwitchSpeed, TransportKind};
    use mockall::predicate::eq;

    const MOUSE_PID: u16 = 0xB030;
    const KEYBOARD_PID: u16 = 0xB033;

    fn config() -> SwitchConfig {
        SwitchConfig::from_settings(&Settings {
            mouse_device: MOUSE_PID,
            keyboard_device: KEYBOARD_PID,
            total_host_devices: 2,
            host_device_sequence_number: 1,
            sync_mode: 4,
            switch_speed_rate: SwitchSpeed::Shorter,
        })
        .expect("valid settings")
    }

    fn identity(product_id: u16, usage_page: u16, usage: u16, path: &str) -> DeviceIdentity {
        DeviceIdentity {
            vendor_id: LOGITECH_VENDOR_ID,
            product_id,
            usage_page,
            usage,
            transport: TransportKind::Wireless,
            path: path.to_string(),
            manufacturer: "Logitech".to_string(),
            product: String::new(),
        }
    }

    fn live(product_id: u16) -> Vec<DeviceIdentity> {
        vec![
            // Non-allow-listed interface first: must be skipped.
            identity(product_id, 0x0001, 0x0002, &format!("{product_id}-boot")),
            identity(product_id, 65347, 514, &format!("{product_id}-vendor")),
        ]
    }

    #[test]
    fn test_both_resolved_live() {
        // Arrange
        let mut transport = MockHidTransport::new();
        transport
            .expect_enumerate()
            .with(eq(Some(LOGITECH_VENDOR_ID)), eq(Some(MOUSE_PID)))
            .times(1)
            .returning(|_, _| Ok(live(MOUSE_PID)));
        transport
            .expect_enumerate()
            .with(eq(Some(LOGITECH_VENDOR_ID)), eq(Some(KEYBOARD_PID)))
            .times(1)
            .returning(|_, _| Ok(live(KEYBOARD_PID)));

        // Act
        let resolved = resolve_peripherals(&transport, &config(), &DeviceCache::default())
            .expect("resolved");

        // Assert
        assert!(resolved.all_live());
        assert_eq!(resolved.peripherals.mouse.path, format!("{MOUSE_PID}-vendor"));
        assert_eq!(resolved.peripherals.keyboard.path, format!("{KEYBOARD_PID}-vendor"));
    }

    #[test]
    fn test_absent_peripheral_falls_back_to_cache() {
        // Arrange
        let mut transport = MockHidTransport::new();
        transport
            .expect_enumerate()
            .returning(|_, pid| match pid {
                Some(MOUSE_PID) => Ok(live(MOUSE_PID)),
                _ => Ok(Vec::new()),
            });
        let mut cache = DeviceCache::default();
        cache.set(
            PeripheralRole::Keyboard,
            identity(KEYBOARD_PID, 65347, 514, "cached-keyboard"),
        );

        // Act
        let resolved = resolve_peripherals(&transport, &config(), &cache).expect("resolved");

        // Assert
        assert_eq!(resolved.source(PeripheralRole::Mouse), IdentitySource::Live);
        assert_eq!(resolved.source(PeripheralRole::Keyboard), IdentitySource::Cache);
        assert_eq!(resolved.peripherals.keyboard.path, "cached-keyboard");
        assert!(!resolved.all_live());
    }

    #[test]
    fn test_enumeration_error_falls_back_to_cache() {
        let mut transport = MockHidTransport::new();
        transport
            .expect_enumerate()
            .returning(|_, _| Err(TransportError::Enumerate("denied".to_string())));
        let mut cache = DeviceCache::default();
        cache.set(PeripheralRole::Mouse, identity(MOUSE_PID, 65347, 514, "m"));
        cache.set(PeripheralRole::Keyboard, identity(KEYBOARD_PID, 65347, 514, "k"));

        let resolved = resolve_peripherals(&transport, &config(), &cache).expect("resolved");

        assert_eq!(resolved.source(PeripheralRole::Mouse), IdentitySource::Cache);
        assert_eq!(resolved.source(PeripheralRole::Keyboard), IdentitySource::Cache);
    }

    #[test]
    fn test_cache_entry_for_other_product_is_ignored() {
        // Arrange: the user picked a new mouse since the cache was written
        let mut transport = MockHidTransport::new();
        transport.expect_enumerate().returning(|_, _| Ok(Vec::new()));
        let mut cache = DeviceCache::default();
        cache.set(PeripheralRole::Mouse, identity(0x4082, 65347, 514, "old-mouse"));

        // Act
        let result = resolve_peripherals(&transport, &config(), &cache);

        // Assert
        assert!(matches!(
            result,
            Err(SwitchError::DeviceUnresolved {
                role: PeripheralRole::Mouse
            })
        ));
    }

    #[test]
    fn test_unresolved_keyboard_is_reported() {
        let mut transport = MockHidTransport::new();
        transport
            .expect_enumerate()
            .returning(|_, pid| match pid {
                Some(MOUSE_PID) => Ok(live(MOUSE_PID)),
                _ => Ok(Vec::new()),
            });

        let result = resolve_peripherals(&transport, &config(), &DeviceCache::default());

        assert!(matches!(
            result,
            Err(SwitchError::DeviceUnresolved {
                role: PeripheralRole::Keyboard
            })
        ));
    }

    #[test]
    fn test_remember_in_stores_both_identities() {
        let resolved = ResolvedPeripherals {
            peripherals: Peripherals::new(
                identity(MOUSE_PID, 65347, 514, "m"),
                identity(KEYBOARD_PID, 65280, 1, "k"),
            ),
            mouse_source: IdentitySource::Live,
            keyboard_source: IdentitySource::Live,
        };
        let mut cache = DeviceCache::default();

        resolved.remember_in(&mut cache);

        assert_eq!(cache.get(PeripheralRole::Mouse).map(|i| i.path.as_str()), Some("m"));
        assert_eq!(cache.get(PeripheralRole::Keyboard).map(|i| i.path.as_str()), Some("k"));
    }
}
