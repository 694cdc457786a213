//! Hands control to the setup tool when settings are incomplete.
//!
//! The setup binary ships next to the switcher.  It is started detached: the
//! switcher exits right away and the user finishes setup in the new process.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::info;

/// Base name of the setup binary.
pub const SETUP_BINARY_NAME: &str = "kamels-setup";

/// Path of the setup binary installed next to the running executable.
///
/// Falls back to the bare name (resolved through `PATH`) if the current
/// executable's location is unknown.
pub fn default_setup_binary() -> PathBuf {
    let file_name = format!("{SETUP_BINARY_NAME}{}", std::env::consts::EXE_SUFFIX);
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(&file_name)))
        .unwrap_or_else(|| PathBuf::from(file_name))
}

/// Starts the setup binary with `config_dir` and does not wait for it.
///
/// # Errors
///
/// Returns the I/O error if the process cannot be spawned.
pub fn launch_setup(binary: &Path, config_dir: &Path) -> io::Result<()> {
    let child = Command::new(binary)
        .arg("--config-dir")
        .arg(config_dir)
        .spawn()?;
    info!("started setup tool {} (pid {})", binary.display(), child.id());
    Ok(())
}
