//! In-memory storage adapter
//!
//! Ephemeral backend for tests and for running without touching disk. Counts
//! mutating calls so callers can assert that an operation wrote nothing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{TouchlineError, TouchlineResult};

use super::adapter::{check_key, disposed_error, StorageAdapter};

const BACKEND: &str = "memory";

#[derive(Default)]
pub struct MemoryAdapter {
    data: RwLock<HashMap<String, String>>,
    writes: AtomicU64,
    disposed: AtomicBool,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an adapter with existing values
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let data = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            data: RwLock::new(data),
            ..Self::default()
        }
    }

    /// Number of `set` and `remove` calls served so far
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Copy of everything stored, for assertions
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.data
            .read()
            .map(|data| data.clone())
            .unwrap_or_default()
    }

    fn check(&self, key: &str) -> TouchlineResult<()> {
        if self.is_disposed() {
            return Err(disposed_error(BACKEND));
        }
        check_key(key)
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> TouchlineError {
    TouchlineError::StorageUnavailable {
        backend: BACKEND,
        reason: format!("lock poisoned: {}", e),
    }
}

#[async_trait]
impl StorageAdapter for MemoryAdapter {
    async fn get(&self, key: &str) -> TouchlineResult<Option<String>> {
        self.check(key)?;
        let data = self.data.read().map_err(poisoned)?;
        Ok(data.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> TouchlineResult<()> {
        self.check(key)?;
        let mut data = self.data.write().map_err(poisoned)?;
        data.insert(key.to_string(), value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove(&self, key: &str) -> TouchlineResult<()> {
        self.check(key)?;
        let mut data = self.data.write().map_err(poisoned)?;
        data.remove(key);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn keys(&self) -> TouchlineResult<Vec<String>> {
        if self.is_disposed() {
            return Err(disposed_error(BACKEND));
        }
        let data = self.data.read().map_err(poisoned)?;
        let mut keys: Vec<_> = data.keys().cloned().collect();
        keys.sort();
        Ok(keys)
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
