//! Settings written by the setup tool are accepted by the switcher.
//!
//! Runs a scripted setup against the in-memory transport, then builds the
//! switcher's run configuration and resolves both peripherals from what was
//! saved, including the case where the Bluetooth keyboard is away on another
//! host and only the device cache knows its path.

use std::io::Cursor;
use std::path::PathBuf;

use kamels_core::{DeviceIdentity, PeripheralRole, TransportKind, LOGITECH_VENDOR_ID};
use kamels_setup::prompt::ConsolePrompter;
use kamels_setup::wizard::SetupWizard;
use kamels_switch::application::bootstrap::{resolve_peripherals, IdentitySource};
use kamels_switch::application::config::SwitchConfig;
use kamels_switch::infrastructure::storage::device_cache::DeviceCacheStore;
use kamels_switch::infrastructure::storage::settings::SettingsStore;
use kamels_switch::infrastructure::transport::mock::MockTransport;
use uuid::Uuid;

fn bluetooth(product_id: u16, path: &str) -> DeviceIdentity {
    DeviceIdentity {
        vendor_id: LOGITECH_VENDOR_ID,
        product_id,
        usage_page: 65347,
        usage: 514,
        transport: TransportKind::Wireless,
        path: path.to_string(),
        manufacturer: "Logitech".to_string(),
        product: String::new(),
    }
}

fn temp_dir() -> PathBuf {
    std::env::temp_dir().join(format!("kamels_flow_{}", Uuid::new_v4()))
}

#[test]
fn test_switcher_accepts_setup_result_and_uses_cache_for_absent_keyboard() {
    // Arrange: setup sees both Bluetooth peripherals
    let dir = temp_dir();
    let settings_store = SettingsStore::in_dir(&dir);
    let cache_store = DeviceCacheStore::in_dir(&dir);
    let transport = MockTransport::new();
    transport.add_device(bluetooth(0xB030, "bt-mouse"));
    transport.add_device(bluetooth(0xB033, "bt-keyboard"));
    let mut prompter = ConsolePrompter::new(
        Cursor::new(b"1\n2\n2\n2\n4\n1\n".to_vec()),
        Vec::new(),
    );
    SetupWizard::new(&transport, &settings_store, &cache_store, &mut prompter)
        .run()
        .expect("setup");

    // Act: later the keyboard is paired to the other host
    transport.set_present("bt-keyboard", false);
    let settings = settings_store.load().expect("settings");
    let config = SwitchConfig::from_settings(&settings).expect("complete");
    let cache = cache_store.load().expect("cache");
    let resolved = resolve_peripherals(&transport, &config, &cache).expect("resolved");

    // Assert
    assert_eq!(config.rotation.destination_slot(), 0);
    assert_eq!(resolved.source(PeripheralRole::Mouse), IdentitySource::Live);
    assert_eq!(resolved.source(PeripheralRole::Keyboard), IdentitySource::Cache);
    assert_eq!(resolved.peripherals.keyboard.path, "bt-keyboard");

    std::fs::remove_dir_all(&dir).ok();
}
