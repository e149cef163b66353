//! Legacy flat key-value store
//!
//! Before the per-key backend existed every collection lived as a string value
//! in one flat map, persisted as a single JSON object file. The store is only
//! read by the migration engine and kept as a fallback until migration
//! commits.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{TouchlineError, TouchlineResult};

use super::adapter::{disposed_error, StorageAdapter};
use super::file_io::{read_optional, remove_if_exists, run_blocking, write_atomic};

const BACKEND: &str = "legacy";

type FlatMap = BTreeMap<String, String>;

pub struct LegacyFileStore {
    path: PathBuf,
    // Serializes this store's own load-modify-save of the single file
    file_lock: Mutex<()>,
    disposed: AtomicBool,
}

impl LegacyFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file_lock: Mutex::new(()),
            disposed: AtomicBool::new(false),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> TouchlineResult<FlatMap> {
        if self.is_disposed() {
            return Err(disposed_error(BACKEND));
        }
        let path = self.path.clone();
        let raw = run_blocking(move || read_optional(path)).await?;
        match raw {
            None => Ok(FlatMap::new()),
            Some(text) if text.trim().is_empty() => Ok(FlatMap::new()),
            Some(text) => serde_json::from_str(&text).map_err(|e| {
                TouchlineError::corrupt(self.path.display().to_string(), e.to_string())
            }),
        }
    }

    async fn save(&self, map: FlatMap) -> TouchlineResult<()> {
        let path = self.path.clone();
        if map.is_empty() {
            return run_blocking(move || remove_if_exists(path)).await;
        }
        let text = serde_json::to_string_pretty(&map)?;
        run_blocking(move || write_atomic(path, &text)).await
    }
}

#[async_trait]
impl StorageAdapter for LegacyFileStore {
    async fn get(&self, key: &str) -> TouchlineResult<Option<String>> {
        let map = self.load().await?;
        Ok(map.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> TouchlineResult<()> {
        let _guard = self.file_lock.lock().await;
        let mut map = self.load().await?;
        map.insert(key.to_string(), value);
        self.save(map).await
    }

    async fn remove(&self, key: &str) -> TouchlineResult<()> {
        let _guard = self.file_lock.lock().await;
        let mut map = self.load().await?;
        if map.remove(key).is_some() {
            self.save(map).await?;
        }
        Ok(())
    }

    async fn keys(&self) -> TouchlineResult<Vec<String>> {
        let map = self.load().await?;
        Ok(map.into_keys().collect())
    }

    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    async fn dispose(&self) -> TouchlineResult<()> {
        self.disposed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}
