//! Backup manager for Touchline
//!
//! Writes full exports as dated JSON files into the backup directory and
//! keeps only the most recent ones.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{StoreConfig, TouchlinePaths};
use crate::error::{TouchlineError, TouchlineResult};
use crate::services::EntityStore;
use crate::storage::file_io::{run_blocking, write_atomic};

use super::document::export_document;

/// Metadata about a backup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupInfo {
    /// Backup filename
    pub filename: String,
    /// Full path to backup
    pub path: PathBuf,
    /// When the backup was created
    pub created_at: DateTime<Utc>,
    /// Size in bytes
    pub size_bytes: u64,
}

/// Manages backup creation and retention
pub struct BackupManager {
    store: EntityStore,
    backup_dir: PathBuf,
    /// Number of backups to keep
    retention: usize,
}

impl BackupManager {
    pub fn new(store: EntityStore, backup_dir: PathBuf, retention: usize) -> Self {
        Self {
            store,
            backup_dir,
            retention,
        }
    }

    /// Manager for the configured backup directory and retention count
    pub fn from_config(store: EntityStore, paths: &TouchlinePaths, config: &StoreConfig) -> Self {
        Self::new(store, paths.backup_dir(), config.backup_retention as usize)
    }

    pub fn retention(&self) -> usize {
        self.retention
    }

    /// Export everything into a new backup file
    ///
    /// Returns the path to the created backup file.
    pub async fn create_backup(&self) -> TouchlineResult<PathBuf> {
        let document = export_document(&self.store).await?;

        let now = document.exported_at;
        let filename = format!(
            "backup-{}-{:03}.json",
            now.format("%Y%m%d-%H%M%S"),
            now.timestamp_subsec_millis()
        );
        let backup_path = self.backup_dir.join(&filename);

        let json = serde_json::to_string_pretty(&document)
            .map_err(|e| TouchlineError::Json(format!("Failed to serialize backup: {}", e)))?;
        let target = backup_path.clone();
        run_blocking(move || write_atomic(target, &json)).await?;

        tracing::info!(path = %backup_path.display(), "backup created");
        Ok(backup_path)
    }

    /// All backups, newest first
    pub async fn list_backups(&self) -> TouchlineResult<Vec<BackupInfo>> {
        let dir = self.backup_dir.clone();
        run_blocking(move || scan_backups(&dir)).await
    }

    /// Delete all but the newest `retention` backups
    pub async fn enforce_retention(&self) -> TouchlineResult<Vec<PathBuf>> {
        let backups = self.list_backups().await?;
        let doomed: Vec<PathBuf> = backups
            .into_iter()
            .skip(self.retention)
            .map(|b| b.path)
            .collect();

        if doomed.is_empty() {
            return Ok(doomed);
        }

        let deleted = doomed.clone();
        run_blocking(move || {
            for path in &doomed {
                fs::remove_file(path).map_err(|e| {
                    TouchlineError::Io(format!("Failed to delete old backup: {}", e))
                })?;
            }
            Ok(())
        })
        .await?;

        tracing::info!(count = deleted.len(), "old backups removed");
        Ok(deleted)
    }

    /// Create a backup and then enforce retention policy
    pub async fn create_backup_with_retention(&self) -> TouchlineResult<(PathBuf, Vec<PathBuf>)> {
        let backup_path = self.create_backup().await?;
        let deleted = self.enforce_retention().await?;
        Ok((backup_path, deleted))
    }

    pub fn backup_dir(&self) -> &PathBuf {
        &self.backup_dir
    }

    pub async fn get_latest_backup(&self) -> TouchlineResult<Option<BackupInfo>> {
        let backups = self.list_backups().await?;
        Ok(backups.into_iter().next())
    }
}

fn scan_backups(dir: &Path) -> TouchlineResult<Vec<BackupInfo>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut backups = Vec::new();

    for entry in fs::read_dir(dir)
        .map_err(|e| TouchlineError::Io(format!("Failed to read backup directory: {}", e)))?
    {
        let entry = entry
            .map_err(|e| TouchlineError::Io(format!("Failed to read directory entry: {}", e)))?;

        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            if let Some(info) = parse_backup_info(&path) {
                backups.push(info);
            }
        }
    }

    backups.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(backups)
}

/// Parse backup info from a file name like `backup-YYYYMMDD-HHMMSS-mmm.json`
fn parse_backup_info(path: &Path) -> Option<BackupInfo> {
    let filename = path.file_name()?.to_string_lossy().to_string();

    let date_part = filename.strip_prefix("backup-")?.strip_suffix(".json")?;
    let created_at = parse_backup_timestamp(date_part)?;

    let size_bytes = fs::metadata(path).ok()?.len();

    Some(BackupInfo {
        filename,
        path: path.to_path_buf(),
        created_at,
        size_bytes,
    })
}

/// Parse a backup timestamp from the filename date part
fn parse_backup_timestamp(date_str: &str) -> Option<DateTime<Utc>> {
    // YYYYMMDD-HHMMSS or YYYYMMDD-HHMMSS-mmm
    let parts: Vec<&str> = date_str.split('-').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return None;
    }

    let date_part = parts[0];
    let time_part = parts[1];
    let millis: u32 = match parts.get(2) {
        Some(ms) => ms.parse().ok()?,
        None => 0,
    };

    if date_part.len() != 8 || time_part.len() != 6 {
        return None;
    }

    let year: i32 = date_part[0..4].parse().ok()?;
    let month: u32 = date_part[4..6].parse().ok()?;
    let day: u32 = date_part[6..8].parse().ok()?;
    let hour: u32 = time_part[0..2].parse().ok()?;
    let minute: u32 = time_part[2..4].parse().ok()?;
    let second: u32 = time_part[4..6].parse().ok()?;

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = chrono::NaiveTime::from_hms_milli_opt(hour, minute, second, millis)?;
    let datetime = chrono::NaiveDateTime::new(date, time);

    Some(DateTime::from_naive_utc_and_offset(datetime, Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::document::BackupDocument;
    use crate::services::TeamService;
    use chrono::Datelike;
    use std::time::Duration;
    use tempfile::TempDir;

    fn create_test_manager() -> (BackupManager, EntityStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TouchlinePaths::with_base_dir(temp_dir.path().to_path_buf());
        let store = EntityStore::open(paths.clone(), &StoreConfig::default());
        let config = StoreConfig {
            backup_retention: 3,
            ..StoreConfig::default()
        };
        let manager = BackupManager::from_config(store.clone(), &paths, &config);
        (manager, store, temp_dir)
    }

    async fn pause() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn test_create_backup() {
        let (manager, store, _temp) = create_test_manager();
        TeamService::new(&store).create("Alpha").await.unwrap();

        let backup_path = manager.create_backup().await.unwrap();
        assert!(backup_path.exists());
        assert!(backup_path.to_string_lossy().contains("backup-"));

        let contents = fs::read_to_string(&backup_path).unwrap();
        let document = BackupDocument::parse(&contents).unwrap();
        assert_eq!(document.collections["teams"].len(), 1);
    }

    #[tokio::test]
    async fn test_list_backups_newest_first() {
        let (manager, _store, _temp) = create_test_manager();

        manager.create_backup().await.unwrap();
        pause().await;
        manager.create_backup().await.unwrap();

        let backups = manager.list_backups().await.unwrap();
        assert_eq!(backups.len(), 2);
        assert!(backups[0].created_at >= backups[1].created_at);
    }

    #[tokio::test]
    async fn test_retention_policy() {
        let (manager, _store, _temp) = create_test_manager();

        for _ in 0..5 {
            manager.create_backup().await.unwrap();
            pause().await;
        }

        let deleted = manager.enforce_retention().await.unwrap();
        assert_eq!(deleted.len(), 2);

        let remaining = manager.list_backups().await.unwrap();
        assert_eq!(remaining.len(), 3);
        assert!(deleted.iter().all(|path| !path.exists()));
    }

    #[tokio::test]
    async fn test_other_files_ignored() {
        let (manager, _store, _temp) = create_test_manager();
        fs::create_dir_all(manager.backup_dir()).unwrap();
        fs::write(
            manager.backup_dir().join("migration-backup-20260101-000000000.json"),
            "{}",
        )
        .unwrap();
        fs::write(manager.backup_dir().join("notes.txt"), "hi").unwrap();

        assert!(manager.list_backups().await.unwrap().is_empty());
        assert!(manager.get_latest_backup().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_backup_with_retention() {
        let (manager, _store, _temp) = create_test_manager();

        for _ in 0..3 {
            manager.create_backup().await.unwrap();
            pause().await;
        }

        let (new_backup, deleted) = manager.create_backup_with_retention().await.unwrap();

        assert!(new_backup.exists());
        assert_eq!(deleted.len(), 1);
        let latest = manager.get_latest_backup().await.unwrap().unwrap();
        assert_eq!(latest.path, new_backup);
    }

    #[test]
    fn test_parse_backup_timestamp() {
        let timestamp = parse_backup_timestamp("20251127-143022").unwrap();
        assert_eq!(timestamp.year(), 2025);
        assert_eq!(timestamp.month(), 11);
        assert_eq!(timestamp.day(), 27);

        let timestamp = parse_backup_timestamp("20251127-143022-456").unwrap();
        assert_eq!(timestamp.timestamp_subsec_millis(), 456);

        assert!(parse_backup_timestamp("2025-11-27").is_none());
        assert!(parse_backup_timestamp("20251127-143022-abc").is_none());
    }
}
