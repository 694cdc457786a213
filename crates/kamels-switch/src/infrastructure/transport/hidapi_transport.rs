//! [`HidTransport`] backed by the `hidapi` crate.
//!
//! `HidApi` caches its device list, so every enumeration calls
//! `refresh_devices` first; a peripheral that just reconnected over
//! Bluetooth would otherwise stay invisible.  The API object needs `&mut` to
//! refresh, so it lives behind a `Mutex`.

use std::ffi::CString;
use std::sync::Mutex;
use std::time::Duration;

use hidapi::{BusType, DeviceInfo, HidApi, HidDevice};
use kamels_core::{DeviceIdentity, TransportKind};
use tracing::trace;

use super::{HidHandle, HidTransport, TransportError};

/// Production HID transport.
pub struct HidApiTransport {
    api: Mutex<HidApi>,
}

impl HidApiTransport {
    /// Initialises the platform HID library.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Init`] if the library cannot be initialised
    /// (missing hidraw permissions, or a second instance in this process).
    pub fn new() -> Result<Self, TransportError> {
        let api = HidApi::new().map_err(|e| TransportError::Init(e.to_string()))?;
        Ok(Self {
            api: Mutex::new(api),
        })
    }
}

impl HidTransport for HidApiTransport {
    fn enumerate(
        &self,
        vendor_id: Option<u16>,
        product_id: Option<u16>,
    ) -> Result<Vec<DeviceIdentity>, TransportError> {
        let mut api = self.api.lock().unwrap_or_else(|e| e.into_inner());
        api.refresh_devices()
            .map_err(|e| TransportError::Enumerate(e.to_string()))?;

        let devices: Vec<DeviceIdentity> = api
            .device_list()
            .filter(|info| vendor_id.map_or(true, |vid| info.vendor_id() == vid))
            .filter(|info| product_id.map_or(true, |pid| info.product_id() == pid))
            .map(identity_from_info)
            .collect();
        trace!("enumerated {} HID interface(s)", devices.len());
        Ok(devices)
    }

    fn open(&self, identity: &DeviceIdentity) -> Result<Box<dyn HidHandle>, TransportError> {
        let open_error = |reason: String| TransportError::Open {
            path: identity.path.clone(),
            reason,
        };
        let c_path = CString::new(identity.path.as_str()).map_err(|e| open_error(e.to_string()))?;

        let api = self.api.lock().unwrap_or_else(|e| e.into_inner());
        let device = api
            .open_path(&c_path)
            .map_err(|e| open_error(e.to_string()))?;

        Ok(Box::new(HidApiHandle {
            device,
            path: identity.path.clone(),
        }))
    }
}

/// Maps a hidapi device record to the domain identity.
///
/// Bluetooth interfaces are `Wireless`; USB and every other bus can be
/// block-read like a receiver and are treated as `Wired`.
fn identity_from_info(info: &DeviceInfo) -> DeviceIdentity {
    let transport = match info.bus_type() {
        BusType::Bluetooth => TransportKind::Wireless,
        _ => TransportKind::Wired,
    };
    DeviceIdentity {
        vendor_id: info.vendor_id(),
        product_id: info.product_id(),
        usage_page: info.usage_page(),
        usage: info.usage(),
        transport,
        path: info.path().to_string_lossy().into_owned(),
        manufacturer: info.manufacturer_string().unwrap_or_default().to_string(),
        product: info.product_string().unwrap_or_default().to_string(),
    }
}

struct HidApiHandle {
    device: HidDevice,
    path: String,
}

impl HidHandle for HidApiHandle {
    fn read(&mut self, buf: &mut [u8], timeout: Option<Duration>) -> Result<usize, TransportError> {
        let result = match timeout {
            None => self.device.read(buf),
            Some(timeout) => {
                let millis = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX);
                self.device.read_timeout(buf, millis)
            }
        };
        result.map_err(|e| TransportError::Read {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        self.device.write(data).map_err(|e| TransportError::Write {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }
}
