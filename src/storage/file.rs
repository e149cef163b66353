//! File-backed storage adapter
//!
//! One JSON file per storage key under the data directory, written with
//! atomic temp-and-rename.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::error::{TouchlineError, TouchlineResult};

use super::adapter::{check_key, disposed_error, StorageAdapter};
use super::file_io::{read_optional, remove_if_exists, run_blocking, write_atomic};

const BACKEND: &str = "file";

pub struct FileAdapter {
    dir: PathBuf,
    disposed: AtomicBool,
}

impl FileAdapter {
    /// Open the adapter, verifying the directory exists and is writable
    pub fn open(dir: impl Into<PathBuf>) -> TouchlineResult<Self> {
        let dir = dir.into();
        probe_writable(&dir).map_err(|reason| TouchlineError::StorageUnavailable {
            backend: BACKEND,
            reason,
        })?;

        tracing::debug!(dir = %dir.display(), "opened file storage");
        Ok(Self {
            dir,
            disposed: AtomicBool::new(false),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> TouchlineResult<PathBuf> {
        if self.is_disposed() {
            return Err(disposed_error(BACKEND));
        }
        check_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

fn probe_writable(dir: &Path) -> Result<(), String> {
    fs::create_dir_all(dir)
        .map_err(|e| format!("cannot create {}: {}", dir.display(), e))?;
    let probe = dir.join(".write-probe");
    fs::write(&probe, b"ok").map_err(|e| format!("{} is not writable: {}", dir.display(), e))?;
    let _ = fs::remove_file(&probe);
    Ok(())
}

#[async_trait]
impl StorageAdapter for FileAdapter {
    async fn get(&self, key: &str) -> TouchlineResult<Option<String>> {
        let path = self.path_for(key)?;
        run_blocking(move || read_optional(path)).await
    }

    async fn set(&self, key: &str, value: String) -> TouchlineResult<()> {
        let path = self.path_for(key)?;
        run_blocking(move || write_atomic(path, &value)).await
    }

    async fn remove(&self, key: &str) -> TouchlineResult<()> {
        let path = self.path_for(key)?;
        run_blocking(move || remove_if_exists(path)).await
    }

    async fn keys(&self) -> TouchlineResult<Vec<String>> {
        if self.is_disposed() {
            return Err(disposed_error(BACKEND));
        }
        let dir = self.dir.clone();
        run_blocking(move || {
            let mut keys = Vec::new();
            for entry in fs::read_dir(&dir).map_err(|e| {
                TouchlineError::Io(format!("Failed to read data directory: {}", e))
            })? {
                let entry = entry.map_err(|e| {
                    TouchlineError::Io(format!("Failed to read directory entry: {}", e))
                })?;
                let name = entry.file_name().to_string_lossy().to_string();
                if let Some(key) = name.strip_suffix(".json") {
                    if check_key(key).is_ok() {
                        keys.push(key.to_string());
                    }
                }
            }
            keys.sort();
            Ok(keys)
        })
        .await
    }

    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    async fn dispose(&self) -> TouchlineResult<()> {
        self.disposed.store(true, Ordering::SeqCst);
        tracing::debug!(dir = %self.dir.display(), "disposed file storage");
        Ok(())
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_set_get_remove() {
        let temp_dir = TempDir::new().unwrap();
        let adapter = FileAdapter::open(temp_dir.path().join("data")).unwrap();

        assert!(adapter.get("soccerSeasons").await.unwrap().is_none());

        adapter.set("soccerSeasons", "{}".into()).await.unwrap();
        assert_eq!(adapter.get("soccerSeasons").await.unwrap().as_deref(), Some("{}"));
        assert!(temp_dir.path().join("data").join("soccerSeasons.json").exists());

        adapter.remove("soccerSeasons").await.unwrap();
        assert!(adapter.get("soccerSeasons").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_keys_lists_only_json_files() {
        let temp_dir = TempDir::new().unwrap();
        let adapter = FileAdapter::open(temp_dir.path()).unwrap();

        adapter.set("b", "1".into()).await.unwrap();
        adapter.set("a", "2".into()).await.unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), "x").unwrap();

        assert_eq!(adapter.keys().await.unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_unwritable_location_is_unavailable() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "file, not dir").unwrap();

        let err = FileAdapter::open(blocker.join("data")).err().unwrap();
        assert!(matches!(err, TouchlineError::StorageUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_disposed_adapter_rejects_calls() {
        let temp_dir = TempDir::new().unwrap();
        let adapter = FileAdapter::open(temp_dir.path()).unwrap();

        adapter.dispose().await.unwrap();
        assert!(adapter.is_disposed());
        assert!(matches!(
            adapter.get("soccerSeasons").await,
            Err(TouchlineError::StorageUnavailable { .. })
        ));
    }
}
