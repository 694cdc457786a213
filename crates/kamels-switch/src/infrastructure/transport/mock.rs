//! In-memory HID transport for tests.
//!
//! # Why a mock transport?
//!
//! The real transport needs a Logitech receiver or Bluetooth peripheral
//! plugged into the test machine, and it cannot be told to "disappear" on
//! cue.  `MockTransport` keeps a list of fake interfaces whose behaviour is
//! scripted by the test:
//!
//! - [`MockTransport::queue_read`] feeds reports (or timeouts, or errors) to
//!   the next reads on a path.
//! - [`MockTransport::set_present`] makes a device vanish from enumeration and
//!   fail every open, as a Bluetooth peripheral does when it switches host.
//! - [`MockTransport::fail_opens`] makes opens fail while the device still
//!   enumerates.
//! - [`MockTransport::writes_to`] returns every report written to a path.
//!
//! All state lives behind one `Arc<Mutex<…>>`, so clones of the transport and
//! the handles it hands out observe the same devices.
//!
//! # Usage in tests
//!
//! ```ignore
//! let transport = MockTransport::new();
//! transport.add_device(keyboard_identity.clone());
//! transport.queue_read(&keyboard_identity.path, MockRead::Report(pattern.to_vec()));
//! // … run a watcher …
//! assert_eq!(transport.writes_to(&mouse_identity.path).len(), 1);
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use kamels_core::DeviceIdentity;

use super::{HidHandle, HidTransport, TransportError};

/// How long an unscripted read pretends to wait before timing out.
const IDLE_READ_DELAY: Duration = Duration::from_millis(2);

/// Scripted outcome of one read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockRead {
    /// A report arrives.
    Report(Vec<u8>),
    /// No report within the timeout.
    Timeout,
    /// The read fails.
    Error,
}

#[derive(Debug)]
struct MockDevice {
    identity: DeviceIdentity,
    present: bool,
    fail_open: bool,
    fail_write: bool,
    reads: VecDeque<MockRead>,
    writes: Vec<Vec<u8>>,
    opens: usize,
}

#[derive(Debug, Default)]
struct MockState {
    devices: Vec<MockDevice>,
    enumerations: usize,
}

impl MockState {
    fn device_mut(&mut self, path: &str) -> Option<&mut MockDevice> {
        self.devices.iter_mut().find(|d| d.identity.path == path)
    }

    fn device(&self, path: &str) -> Option<&MockDevice> {
        self.devices.iter().find(|d| d.identity.path == path)
    }
}

/// A fake [`HidTransport`] whose devices are scripted by the test.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Adds a present, openable device.  Enumeration order is insertion order.
    pub fn add_device(&self, identity: DeviceIdentity) {
        self.lock().devices.push(MockDevice {
            identity,
            present: true,
            fail_open: false,
            fail_write: false,
            reads: VecDeque::new(),
            writes: Vec::new(),
            opens: 0,
        });
    }

    /// Makes the device at `path` appear in or vanish from the bus.
    pub fn set_present(&self, path: &str, present: bool) {
        if let Some(device) = self.lock().device_mut(path) {
            device.present = present;
        }
    }

    /// Makes opens of `path` fail while it still enumerates.
    pub fn fail_opens(&self, path: &str, fail: bool) {
        if let Some(device) = self.lock().device_mut(path) {
            device.fail_open = fail;
        }
    }

    /// Makes writes to `path` fail.
    pub fn fail_writes(&self, path: &str, fail: bool) {
        if let Some(device) = self.lock().device_mut(path) {
            device.fail_write = fail;
        }
    }

    /// Queues the outcome of a future read on `path`.
    pub fn queue_read(&self, path: &str, read: MockRead) {
        if let Some(device) = self.lock().device_mut(path) {
            device.reads.push_back(read);
        }
    }

    /// Every report written to `path`, oldest first.
    pub fn writes_to(&self, path: &str) -> Vec<Vec<u8>> {
        self.lock()
            .device(path)
            .map(|d| d.writes.clone())
            .unwrap_or_default()
    }

    /// Total number of reports written to any device.
    pub fn total_writes(&self) -> usize {
        self.lock().devices.iter().map(|d| d.writes.len()).sum()
    }

    /// Number of successful opens of `path`.
    pub fn open_count(&self, path: &str) -> usize {
        self.lock().device(path).map_or(0, |d| d.opens)
    }

    /// Number of enumeration passes performed.
    pub fn enumeration_count(&self) -> usize {
        self.lock().enumerations
    }

    /// Number of scripted reads not consumed yet on `path`.
    pub fn pending_reads(&self, path: &str) -> usize {
        self.lock().device(path).map_or(0, |d| d.reads.len())
    }
}

impl HidTransport for MockTransport {
    fn enumerate(
        &self,
        vendor_id: Option<u16>,
        product_id: Option<u16>,
    ) -> Result<Vec<DeviceIdentity>, TransportError> {
        let mut state = self.lock();
        state.enumerations += 1;
        Ok(state
            .devices
            .iter()
            .filter(|d| d.present)
            .filter(|d| vendor_id.map_or(true, |vid| d.identity.vendor_id == vid))
            .filter(|d| product_id.map_or(true, |pid| d.identity.product_id == pid))
            .map(|d| d.identity.clone())
            .collect())
    }

    fn open(&self, identity: &DeviceIdentity) -> Result<Box<dyn HidHandle>, TransportError> {
        let mut state = self.lock();
        let device = state
            .device_mut(&identity.path)
            .filter(|d| d.present && !d.fail_open)
            .ok_or_else(|| TransportError::Open {
                path: identity.path.clone(),
                reason: "device not connected".to_string(),
            })?;
        device.opens += 1;
        Ok(Box::new(MockHandle {
            path: identity.path.clone(),
            state: Arc::clone(&self.state),
        }))
    }
}

struct MockHandle {
    path: String,
    state: Arc<Mutex<MockState>>,
}

impl MockHandle {
    fn read_error(&self) -> TransportError {
        TransportError::Read {
            path: self.path.clone(),
            reason: "device not connected".to_string(),
        }
    }
}

impl HidHandle for MockHandle {
    fn read(&mut self, buf: &mut [u8], _timeout: Option<Duration>) -> Result<usize, TransportError> {
        let next = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            let device = match state.device_mut(&self.path) {
                Some(device) if device.present => device,
                _ => return Err(self.read_error()),
            };
            device.reads.pop_front()
        };

        match next {
            Some(MockRead::Report(report)) => {
                let n = report.len().min(buf.len());
                buf[..n].copy_from_slice(&report[..n]);
                Ok(n)
            }
            Some(MockRead::Error) => Err(self.read_error()),
            Some(MockRead::Timeout) => Ok(0),
            None => {
                // Nothing scripted: behave like a quiet device.
                std::thread::sleep(IDLE_READ_DELAY);
                Ok(0)
            }
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        match state.device_mut(&self.path) {
            Some(device) if device.present && !device.fail_write => {
                device.writes.push(data.to_vec());
                Ok(data.len())
            }
            _ => Err(TransportError::Write {
                path: self.path.clone(),
                reason: "device not connected".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kamels_core::{TransportKind, LOGITECH_VENDOR_ID};

    fn identity(path: &str, product_id: u16) -> DeviceIdentity {
        DeviceIdentity {
            vendor_id: LOGITECH_VENDOR_ID,
            product_id,
            usage_page: 65347,
            usage: 514,
            transport: TransportKind::Wireless,
            path: path.to_string(),
            manufacturer: "Logitech".to_string(),
            product: "POP Mouse".to_string(),
        }
    }

    #[test]
    fn test_enumerate_filters_by_product_and_presence() {
        // Arrange
        let transport = MockTransport::new();
        transport.add_device(identity("a", 1));
        transport.add_device(identity("b", 2));
        transport.add_device(identity("c", 2));
        transport.set_present("c", false);

        // Act
        let found = transport.enumerate(Some(LOGITECH_VENDOR_ID), Some(2)).unwrap();

        // Assert
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, "b");
        assert_eq!(transport.enumeration_count(), 1);
    }

    #[test]
    fn test_open_fails_for_absent_device() {
        let transport = MockTransport::new();
        transport.add_device(identity("a", 1));
        transport.set_present("a", false);
        assert!(matches!(
            transport.open(&identity("a", 1)),
            Err(TransportError::Open { .. })
        ));
    }

    #[test]
    fn test_open_fails_when_scripted_to() {
        let transport = MockTransport::new();
        transport.add_device(identity("a", 1));
        transport.fail_opens("a", true);
        assert!(transport.open(&identity("a", 1)).is_err());
        assert_eq!(transport.open_count("a"), 0);
    }

    #[test]
    fn test_scripted_reads_are_returned_in_order() {
        // Arrange
        let transport = MockTransport::new();
        transport.add_device(identity("a", 1));
        transport.queue_read("a", MockRead::Report(vec![1, 2, 3]));
        transport.queue_read("a", MockRead::Timeout);
        transport.queue_read("a", MockRead::Error);
        let mut handle = transport.open(&identity("a", 1)).unwrap();
        let mut buf = [0u8; 7];

        // Act / Assert
        assert_eq!(handle.read(&mut buf, None).unwrap(), 3);
        assert_eq!(&buf[..3], &[1, 2, 3]);
        assert_eq!(handle.read(&mut buf, Some(Duration::from_millis(5))).unwrap(), 0);
        assert!(handle.read(&mut buf, None).is_err());
    }

    #[test]
    fn test_writes_are_recorded_per_device() {
        let transport = MockTransport::new();
        transport.add_device(identity("a", 1));
        transport.add_device(identity("b", 2));
        let mut handle = transport.open(&identity("b", 2)).unwrap();

        handle.write(&[0x10, 0x01]).unwrap();

        assert!(transport.writes_to("a").is_empty());
        assert_eq!(transport.writes_to("b"), vec![vec![0x10, 0x01]]);
        assert_eq!(transport.total_writes(), 1);
    }

    #[test]
    fn test_handle_fails_after_device_vanishes() {
        let transport = MockTransport::new();
        transport.add_device(identity("a", 1));
        let mut handle = transport.open(&identity("a", 1)).unwrap();

        transport.set_present("a", false);

        let mut buf = [0u8; 7];
        assert!(handle.read(&mut buf, None).is_err());
        assert!(handle.write(&[0x11]).is_err());
    }

    #[test]
    fn test_failing_writes_are_not_recorded() {
        let transport = MockTransport::new();
        transport.add_device(identity("a", 1));
        transport.fail_writes("a", true);
        let mut handle = transport.open(&identity("a", 1)).unwrap();
        assert!(handle.write(&[0x11]).is_err());
        assert!(transport.writes_to("a").is_empty());
    }
}
