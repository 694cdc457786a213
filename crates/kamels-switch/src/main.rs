//! KAMELS switcher entry point.
//!
//! ```text
//! main()
//!  └─ SettingsStore::load()            -- settings.toml
//!  └─ SwitchConfig::from_settings()    -- incomplete? launch setup, exit 2
//!  └─ HidApiTransport::new()
//!  └─ resolve_peripherals()            -- live, then devices.toml
//!  └─ orchestrator::run()
//!       ├─ sync mode 1: switch both, exit
//!       └─ modes 2-4: watchers + recovery task until Ctrl-C
//! ```
//!
//! # Exit codes
//!
//! | Code | Meaning                                                  |
//! |------|----------------------------------------------------------|
//! | 0    | normal exit                                              |
//! | 1    | fatal error (device unresolved, storage, HID init)       |
//! | 2    | configuration incomplete, setup tool launched            |

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use kamels_switch::application::bootstrap::resolve_peripherals;
use kamels_switch::application::config::SwitchConfig;
use kamels_switch::application::error::SwitchError;
use kamels_switch::application::orchestrator;
use kamels_switch::infrastructure::launcher::{default_setup_binary, launch_setup};
use kamels_switch::infrastructure::storage::{
    config_dir, device_cache::DeviceCacheStore, settings::SettingsStore,
};
use kamels_switch::infrastructure::transport::hidapi_transport::HidApiTransport;
use kamels_switch::infrastructure::transport::HidTransport;

/// Exit code used when setup has to run first.
const EXIT_SETUP_REQUIRED: u8 = 2;

/// Keeps a Logitech multi-host mouse and keyboard on the same host.
#[derive(Debug, Parser)]
#[command(
    name = "kamels-switch",
    about = "Keeps a Logitech multi-host keyboard and mouse switching together",
    version
)]
struct Cli {
    /// Directory holding settings.toml and devices.toml.
    ///
    /// Defaults to the platform configuration directory.
    #[arg(long, env = "KAMELS_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Setup tool started when the settings are incomplete.
    ///
    /// Defaults to `kamels-setup` next to this executable.
    #[arg(long, env = "KAMELS_SETUP_BIN")]
    setup_binary: Option<PathBuf>,

    /// Report incomplete settings without starting the setup tool.
    #[arg(long)]
    no_setup: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config_dir = match cli.config_dir {
        Some(dir) => dir,
        None => config_dir()?,
    };
    info!("KAMELS switcher starting (config: {})", config_dir.display());

    // ── Settings ──────────────────────────────────────────────────────────────
    let settings = SettingsStore::in_dir(&config_dir).load()?;
    let config = match SwitchConfig::from_settings(&settings) {
        Ok(config) => config,
        Err(SwitchError::ConfigIncomplete(reason)) => {
            warn!("settings incomplete: {reason}");
            if cli.no_setup {
                error!("settings are incomplete; run kamels-setup first");
            } else {
                let binary = cli.setup_binary.unwrap_or_else(default_setup_binary);
                launch_setup(&binary, &config_dir)?;
                info!("finish setup in the new window, then start the switcher again");
            }
            return Ok(ExitCode::from(EXIT_SETUP_REQUIRED));
        }
        Err(e) => return Err(e.into()),
    };

    // ── Devices ───────────────────────────────────────────────────────────────
    let transport: Arc<dyn HidTransport> = Arc::new(HidApiTransport::new()?);

    let cache_store = DeviceCacheStore::in_dir(&config_dir);
    let mut cache = cache_store.load().unwrap_or_else(|e| {
        warn!("ignoring device cache: {e}");
        Default::default()
    });

    let resolved = match resolve_peripherals(transport.as_ref(), &config, &cache) {
        Ok(resolved) => resolved,
        Err(e @ SwitchError::DeviceUnresolved { .. }) => {
            error!("{e}");
            eprintln!("{e}. Connect it to this host once, or run kamels-setup again.");
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e.into()),
    };

    if resolved.all_live() {
        resolved.remember_in(&mut cache);
        if let Err(e) = cache_store.save(&cache) {
            warn!("could not refresh device cache: {e}");
        }
    }

    // ── Ctrl-C handler ────────────────────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            running_clone.store(false, Ordering::SeqCst);
        }
    });

    // ── Run ───────────────────────────────────────────────────────────────────
    orchestrator::run(config, resolved.peripherals, transport, running).await?;

    info!("KAMELS switcher stopped");
    Ok(ExitCode::SUCCESS)
}
