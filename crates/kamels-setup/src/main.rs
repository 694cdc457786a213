//! KAMELS setup tool entry point.
//!
//! Started by `kamels-switch` when its settings are incomplete, or by hand to
//! finish or redo a setup.  Delete `settings.toml` (or single keys in it) to
//! be asked again.

use std::io;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kamels_setup::prompt::{ConsolePrompter, Prompter};
use kamels_setup::wizard::SetupWizard;
use kamels_switch::infrastructure::storage::{
    config_dir, device_cache::DeviceCacheStore, settings::SettingsStore,
};
use kamels_switch::infrastructure::transport::hidapi_transport::HidApiTransport;

/// Interactive setup for the KAMELS switcher.
#[derive(Debug, Parser)]
#[command(
    name = "kamels-setup",
    about = "Interactive setup for the KAMELS keyboard and mouse switcher",
    version
)]
struct Cli {
    /// Directory holding settings.toml and devices.toml.
    ///
    /// Defaults to the platform configuration directory.
    #[arg(long, env = "KAMELS_CONFIG_DIR")]
    config_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config_dir = match cli.config_dir {
        Some(dir) => dir,
        None => config_dir()?,
    };
    info!("configuration directory: {}", config_dir.display());

    let transport = HidApiTransport::new()?;
    let settings_store = SettingsStore::in_dir(&config_dir);
    let cache_store = DeviceCacheStore::in_dir(&config_dir);

    let stdin = io::stdin();
    let mut prompter = ConsolePrompter::new(stdin.lock(), io::stdout());

    let outcome =
        SetupWizard::new(&transport, &settings_store, &cache_store, &mut prompter).run()?;

    if outcome.changed {
        prompter.say(&format!(
            "\nSettings saved to {}",
            settings_store.path().display()
        ))?;
        prompter.ask("Press 'Enter' to finish the setup ...")?;
    } else {
        println!("Settings are complete: {}", settings_store.path().display());
    }
    Ok(())
}
