//! Persisted device cache (`devices.toml`).
//!
//! A Bluetooth peripheral that is currently paired to another host does not
//! enumerate here at all, yet the switcher still needs its path to watch for
//! its return.  The setup tool and the switcher record the last identity seen
//! for each role:
//!
//! ```toml
//! [mouse]
//! vendor_id = 1133
//! product_id = 45077
//! usage_page = 65347
//! usage = 514
//! transport = "wireless"
//! path = "/dev/hidraw5"
//! manufacturer = "Logitech"
//! product = "POP Mouse"
//! ```

use std::path::{Path, PathBuf};

use kamels_core::{DeviceIdentity, PeripheralRole};
use serde::{Deserialize, Serialize};

use super::{read_toml, write_toml, StorageError};

/// File name inside the config directory.
pub const DEVICE_CACHE_FILE: &str = "devices.toml";

/// Last-known identity per role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCache {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mouse: Option<DeviceIdentity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    keyboard: Option<DeviceIdentity>,
}

impl DeviceCache {
    pub fn get(&self, role: PeripheralRole) -> Option<&DeviceIdentity> {
        match role {
            PeripheralRole::Mouse => self.mouse.as_ref(),
            PeripheralRole::Keyboard => self.keyboard.as_ref(),
        }
    }

    pub fn set(&mut self, role: PeripheralRole, identity: DeviceIdentity) {
        match role {
            PeripheralRole::Mouse => self.mouse = Some(identity),
            PeripheralRole::Keyboard => self.keyboard = Some(identity),
        }
    }
}

/// Reads and writes [`DeviceCache`] at a fixed path.
#[derive(Debug, Clone)]
pub struct DeviceCacheStore {
    path: PathBuf,
}

impl DeviceCacheStore {
    /// A store for `devices.toml` inside `config_dir`.
    pub fn in_dir(config_dir: &Path) -> Self {
        Self {
            path: config_dir.join(DEVICE_CACHE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the cache; a missing file is an empty cache.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] or [`StorageError::Parse`].
    pub fn load(&self) -> Result<DeviceCache, StorageError> {
        Ok(read_toml(&self.path)?.unwrap_or_default())
    }

    /// Persists `cache`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] or [`StorageError::Serialize`].
    pub fn save(&self, cache: &DeviceCache) -> Result<(), StorageError> {
        write_toml(&self.path, "", cache)
    }
}
