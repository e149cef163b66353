//! Path management for Touchline
//!
//! Provides XDG-compliant path resolution for configuration, data, and backups.
//!
//! ## Path Resolution Order
//!
//! 1. `TOUCHLINE_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/touchline` or `~/.config/touchline`
//! 3. Windows: `%APPDATA%\touchline`

use std::path::PathBuf;

use crate::error::TouchlineError;

/// Manages all paths used by Touchline
#[derive(Debug, Clone)]
pub struct TouchlinePaths {
    /// Base directory for all Touchline data
    base_dir: PathBuf,
}

impl TouchlinePaths {
    /// Create a new TouchlinePaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, TouchlineError> {
        let base_dir = if let Ok(custom) = std::env::var("TOUCHLINE_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create TouchlinePaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Directory holding one JSON file per storage key
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Directory holding exports and migration snapshots
    pub fn backup_dir(&self) -> PathBuf {
        self.base_dir.join("backups")
    }

    /// Path to the store configuration file
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Path to the flat pre-migration key-value store
    pub fn legacy_file(&self) -> PathBuf {
        self.base_dir.join("legacy.json")
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<(), TouchlineError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| TouchlineError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| TouchlineError::Io(format!("Failed to create data directory: {}", e)))?;

        std::fs::create_dir_all(self.backup_dir()).map_err(|e| {
            TouchlineError::Io(format!("Failed to create backup directory: {}", e))
        })?;

        Ok(())
    }
}

/// Resolve the default data directory path based on platform
#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, TouchlineError> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg).join("touchline"));
    }
    let dirs = directories::BaseDirs::new()
        .ok_or_else(|| TouchlineError::Config("Could not determine home directory".into()))?;
    Ok(dirs.home_dir().join(".config").join("touchline"))
}

/// Resolve the default data directory path based on platform
#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, TouchlineError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| TouchlineError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("touchline"))
}
