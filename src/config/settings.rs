//! Store configuration for Touchline
//!
//! The named tunables of the persistence layer. Every field has a default so a
//! partial or missing `config.json` still yields a usable configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::paths::TouchlinePaths;
use crate::error::TouchlineError;

/// Which physical storage technology backs the entity collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// One JSON file per storage key under the data directory
    #[default]
    File,
    /// Process memory only; nothing survives a restart
    Memory,
}

/// Tunables for locking, migration and backups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Ceiling on how long a caller waits for a key lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,

    /// How many times `run_with_retry` attempts a migration
    #[serde(default = "default_migration_retry_count")]
    pub migration_retry_count: u32,

    #[serde(default)]
    pub backend: BackendKind,

    /// Number of export files kept in the backup directory
    #[serde(default = "default_backup_retention")]
    pub backup_retention: u32,
}

fn default_schema_version() -> u32 {
    1
}

fn default_lock_timeout_ms() -> u64 {
    10_000
}

fn default_migration_retry_count() -> u32 {
    3
}

fn default_backup_retention() -> u32 {
    10
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            lock_timeout_ms: default_lock_timeout_ms(),
            migration_retry_count: default_migration_retry_count(),
            backend: BackendKind::default(),
            backup_retention: default_backup_retention(),
        }
    }
}

impl StoreConfig {
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    /// Load the configuration from disk, or the defaults if the file doesn't exist
    pub fn load_or_create(paths: &TouchlinePaths) -> Result<Self, TouchlineError> {
        let config_path = paths.config_file();

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(|e| {
                TouchlineError::Io(format!("Failed to read config file: {}", e))
            })?;

            let config: StoreConfig = serde_json::from_str(&contents).map_err(|e| {
                TouchlineError::Config(format!("Failed to parse config file: {}", e))
            })?;

            config.validate()?;
            Ok(config)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(StoreConfig::default())
        }
    }

    /// Save the configuration to disk
    pub fn save(&self, paths: &TouchlinePaths) -> Result<(), TouchlineError> {
        self.validate()?;
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            TouchlineError::Config(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(paths.config_file(), contents)
            .map_err(|e| TouchlineError::Io(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    fn validate(&self) -> Result<(), TouchlineError> {
        if self.lock_timeout_ms == 0 {
            return Err(TouchlineError::Config(
                "lock_timeout_ms must be greater than zero".into(),
            ));
        }
        if self.migration_retry_count == 0 {
            return Err(TouchlineError::Config(
                "migration_retry_count must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
