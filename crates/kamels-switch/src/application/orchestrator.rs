//! Runs one switcher session for a validated configuration.
//!
//! - **One-shot** (sync mode 1): switch both peripherals to the destination
//!   slot and return.
//! - **Looping** (modes 2-4): spawn one watcher per watched peripheral plus
//!   the recovery task, then wait for all of them.  They return once the
//!   shared `running` flag is cleared.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use kamels_core::PeripheralRole;
use tokio::task::JoinHandle;
use tracing::info;

use crate::application::config::SwitchConfig;
use crate::application::connection_monitor::ConnectionMonitor;
use crate::application::dispatch::Dispatcher;
use crate::application::error::SwitchError;
use crate::application::peripherals::Peripherals;
use crate::application::watchers::{refresh_connections, watch_peripheral};
use crate::infrastructure::transport::HidTransport;

/// Runs the session described by `config` against `peripherals`.
///
/// # Errors
///
/// In one-shot mode, returns the transport error of the peripheral that
/// could not be switched.  In looping mode, only a panicked task is an
/// error; transport failures are absorbed by the watchers.
pub async fn run(
    config: SwitchConfig,
    peripherals: Peripherals,
    transport: Arc<dyn HidTransport>,
    running: Arc<AtomicBool>,
) -> Result<(), SwitchError> {
    let dispatcher = Arc::new(Dispatcher::new(
        transport,
        Arc::new(ConnectionMonitor::new()),
        peripherals,
        config.rotation.destination_slot(),
    ));

    if config.sync_mode.is_one_shot() {
        info!(
            "switching both peripherals to host slot {}",
            dispatcher.destination_slot()
        );
        let one_shot = Arc::clone(&dispatcher);
        return tokio::task::spawn_blocking(move || one_shot.switch_both()).await?;
    }

    info!(
        "sync mode {}: {}",
        config.sync_mode.code(),
        config.sync_mode.description()
    );

    let mut tasks: Vec<JoinHandle<Result<(), SwitchError>>> = PeripheralRole::ALL
        .into_iter()
        .filter(|&role| config.sync_mode.watches(role))
        .map(|role| {
            tokio::spawn(watch_peripheral(
                Arc::clone(&dispatcher),
                role,
                config.poll_interval,
                Arc::clone(&running),
            ))
        })
        .collect();
    tasks.push(tokio::spawn(refresh_connections(
        Arc::clone(&dispatcher),
        config.poll_interval,
        Arc::clone(&running),
    )));

    let mut first_error = None;
    for task in tasks {
        let result = match task.await {
            Ok(result) => result,
            Err(e) => Err(SwitchError::from(e)),
        };
        if let Err(e) = result {
            first_error.get_or_insert(e);
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => {
            info!("all watchers stopped");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::settings::Settings;
    use crate::infrastructure::transport::mock::MockTransport;
    use kamels_core::{DeviceIdentity, SwitchSpeed, TransportKind, LOGITECH_VENDOR_ID};
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn identity(product_id: u16, path: &str) -> DeviceIdentity {
        DeviceIdentity {
            vendor_id: LOGITECH_VENDOR_ID,
            product_id,
            usage_page: 65280,
            usage: 1,
            transport: TransportKind::Wired,
            path: path.to_string(),
            manufacturer: "Logitech".to_string(),
            product: String::new(),
        }
    }

    fn config(sync_mode: u16) -> SwitchConfig {
        SwitchConfig::from_settings(&Settings {
            mouse_device: 0xC548,
            keyboard_device: 0xC548,
            total_host_devices: 3,
            host_device_sequence_number: 2,
            sync_mode,
            switch_speed_rate: SwitchSpeed::Shortest,
        })
        .expect("valid settings")
    }

    fn transport() -> (MockTransport, Peripherals) {
        let mock = MockTransport::new();
        let peripherals = Peripherals::new(identity(0xC548, "mouse"), identity(0xC548, "keyboard"));
        mock.add_device(peripherals.mouse.clone());
        mock.add_device(peripherals.keyboard.clone());
        (mock, peripherals)
    }

    #[tokio::test]
    async fn test_one_shot_switches_both_and_returns() {
        // Arrange
        let (mock, peripherals) = transport();
        let running = Arc::new(AtomicBool::new(true));

        // Act
        tokio_test::assert_ok!(run(config(1), peripherals, Arc::new(mock.clone()), running).await);

        // Assert
        assert_eq!(
            mock.writes_to("mouse"),
            vec![vec![0x10, 0x02, 0x0A, 0x1E, 0x02, 0x00, 0x00]]
        );
        assert_eq!(
            mock.writes_to("keyboard"),
            vec![vec![0x10, 0x01, 0x09, 0x16, 0x02, 0x00, 0x00]]
        );
    }

    #[tokio::test]
    async fn test_looping_mode_stops_when_flag_cleared() {
        // Arrange
        let (mock, peripherals) = transport();
        let running = Arc::new(AtomicBool::new(true));
        let session = tokio::spawn(run(
            config(4),
            peripherals,
            Arc::new(mock.clone()),
            Arc::clone(&running),
        ));

        // Act
        tokio::time::sleep(Duration::from_millis(50)).await;
        running.store(false, Ordering::SeqCst);
        let joined = tokio::time::timeout(Duration::from_secs(3), session).await;

        // Assert
        assert!(matches!(joined, Ok(Ok(Ok(())))));
        assert_eq!(mock.total_writes(), 0);
        assert!(mock.open_count("mouse") >= 1);
        assert!(mock.open_count("keyboard") >= 1);
    }

    #[tokio::test]
    async fn test_mode_two_watches_keyboard_only() {
        let (mock, peripherals) = transport();
        let running = Arc::new(AtomicBool::new(true));
        let session = tokio::spawn(run(
            config(2),
            peripherals,
            Arc::new(mock.clone()),
            Arc::clone(&running),
        ));

        tokio::time::sleep(Duration::from_millis(50)).await;
        running.store(false, Ordering::SeqCst);
        session.await.expect("join").expect("session");

        assert_eq!(mock.open_count("mouse"), 0);
        assert!(mock.open_count("keyboard") >= 1);
    }
}
