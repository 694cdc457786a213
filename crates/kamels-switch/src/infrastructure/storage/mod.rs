//! Storage infrastructure: settings and device-cache persistence.
//!
//! Both files are TOML and live in the same directory:
//! - Windows:  `%APPDATA%\Kamels\`
//! - Linux:    `$XDG_CONFIG_HOME/kamels/` or `~/.config/kamels/`
//! - macOS:    `~/Library/Application Support/Kamels/`
//!
//! The directory can be overridden from the command line, which is also how
//! tests point the stores at a temporary directory.
//!
//! - `settings`: the user's choices (`settings.toml`).
//! - `device_cache`: last-known full identity of each peripheral
//!   (`devices.toml`), used when a peripheral is paired to another host and
//!   therefore invisible to live enumeration.

use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

pub mod device_cache;
pub mod settings;

/// Error type for storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The value could not be serialized to TOML.
    #[error("failed to serialize: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Determines the platform-appropriate directory for both files.
///
/// # Errors
///
/// Returns [`StorageError::NoPlatformConfigDir`] when the base directory
/// cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, StorageError> {
    platform_config_dir().ok_or(StorageError::NoPlatformConfigDir)
}

/// Reads and parses `path`, returning `Ok(None)` if the file does not exist.
pub(crate) fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content)
            .map(Some)
            .map_err(|source| StorageError::Parse {
                path: path.to_path_buf(),
                source,
            }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StorageError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Serializes `value` and writes it to `path` below an optional header
/// comment, creating the parent directory if needed.
pub(crate) fn write_toml<T: Serialize>(
    path: &Path,
    header: &str,
    value: &T,
) -> Result<(), StorageError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| StorageError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let body = toml::to_string_pretty(value)?;
    let content = if header.is_empty() {
        body
    } else {
        format!("{header}\n\n{body}")
    };
    std::fs::write(path, content).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("Kamels"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("kamels"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("Kamels")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}
