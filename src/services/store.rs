//! Lock-wrapped read-modify-write over stored collections
//!
//! `EntityStore` is the only path services use to reach storage. Every
//! mutation runs as one unit under the key's lock: read the full value,
//! change it in memory, write the full value back.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{StoreConfig, TouchlinePaths};
use crate::error::{TouchlineError, TouchlineResult};
use crate::lock::{KeyLock, KeyLockGuard, LOCK_ORDER};
use crate::models::{Collection, Entity, Validate};
use crate::storage::{decode, encode, read_value, ReadMode, StorageAdapter, StorageFactory, StorageKey};

/// Key under which an unreadable value is preserved before being replaced
pub fn quarantine_key(key: StorageKey) -> String {
    format!("{}-corrupt", key.as_str())
}

#[derive(Clone)]
pub struct EntityStore {
    factory: Arc<StorageFactory>,
    locks: KeyLock,
}

impl EntityStore {
    pub fn new(factory: Arc<StorageFactory>, locks: KeyLock) -> Self {
        Self { factory, locks }
    }

    /// Build the store described by a configuration file
    pub fn open(paths: TouchlinePaths, config: &StoreConfig) -> Self {
        let factory = StorageFactory::new(paths, config.backend);
        Self::new(Arc::new(factory), KeyLock::new(config.lock_timeout()))
    }

    pub fn factory(&self) -> &Arc<StorageFactory> {
        &self.factory
    }

    pub fn locks(&self) -> &KeyLock {
        &self.locks
    }

    pub async fn adapter(&self) -> TouchlineResult<Arc<dyn StorageAdapter>> {
        self.factory.adapter().await
    }

    /// Read a value outside any lock, for display and lookups only
    pub async fn load<T>(&self, key: StorageKey, mode: ReadMode) -> TouchlineResult<T>
    where
        T: DeserializeOwned + Default + Validate,
    {
        let adapter = self.adapter().await?;
        read_value(adapter.as_ref(), key.as_str(), mode).await
    }

    pub async fn load_collection<E: Entity>(&self) -> TouchlineResult<Collection<E>> {
        self.load(E::KEY, ReadMode::Lenient).await
    }

    /// Read-modify-write `key` under its lock
    ///
    /// If `mutate` fails nothing is written. The returned value is whatever
    /// `mutate` derived from the collection.
    pub async fn update<T, R, F>(&self, key: StorageKey, mutate: F) -> TouchlineResult<R>
    where
        T: Serialize + DeserializeOwned + Default + Validate,
        F: FnOnce(&mut T) -> TouchlineResult<R>,
    {
        let guard = self.locks.acquire(key.as_str()).await?;
        let mut value: T = self.read_locked(&guard, key).await?;
        let result = mutate(&mut value)?;
        self.write_locked(&guard, key, &value).await?;
        Ok(result)
    }

    pub async fn update_collection<E, R, F>(&self, mutate: F) -> TouchlineResult<R>
    where
        E: Entity,
        F: FnOnce(&mut Collection<E>) -> TouchlineResult<R>,
    {
        self.update(E::KEY, mutate).await
    }

    /// Read `key` while holding its lock
    ///
    /// An unreadable value is logged, copied aside under its quarantine key
    /// and replaced by the default, so the write that follows cannot silently
    /// destroy the only copy.
    pub async fn read_locked<T>(&self, guard: &KeyLockGuard, key: StorageKey) -> TouchlineResult<T>
    where
        T: DeserializeOwned + Default + Validate,
    {
        check_guard(guard, key)?;
        let adapter = self.adapter().await?;
        let raw = adapter.get(key.as_str()).await?;

        match decode::<T>(key.as_str(), raw.as_deref(), ReadMode::Strict) {
            Ok(value) => Ok(value),
            Err(TouchlineError::CorruptData { reason, .. }) => {
                tracing::warn!(
                    key = %key,
                    reason = %reason,
                    "corrupt collection, quarantining raw value and starting from empty"
                );
                if let Some(raw) = raw {
                    adapter.set(&quarantine_key(key), raw).await?;
                }
                Ok(T::default())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn write_locked<T>(&self, guard: &KeyLockGuard, key: StorageKey, value: &T) -> TouchlineResult<()>
    where
        T: Serialize + Validate,
    {
        check_guard(guard, key)?;
        // Validate before touching the backend
        let encoded = encode(key.as_str(), value)?;
        let adapter = self.adapter().await?;
        adapter.set(key.as_str(), encoded).await
    }

    /// Take the personnel and games locks in the system-wide order
    pub async fn lock_personnel_and_games(&self) -> TouchlineResult<(KeyLockGuard, KeyLockGuard)> {
        let [first, second] = LOCK_ORDER;
        let first = self.locks.acquire(first.as_str()).await?;
        let second = self.locks.acquire(second.as_str()).await?;
        Ok((first, second))
    }

    pub async fn list<E: Entity>(&self) -> TouchlineResult<Vec<E>> {
        Ok(self.load_collection::<E>().await?.into_values().collect())
    }

    pub async fn get<E: Entity>(&self, id: &str) -> TouchlineResult<Option<E>> {
        Ok(self.load_collection::<E>().await?.remove(id))
    }

    /// Change one record in place and return its new state
    ///
    /// `change` runs on a copy; the record is validated before it replaces
    /// the stored one.
    pub async fn modify<E, F>(&self, id: &str, change: F) -> TouchlineResult<E>
    where
        E: Entity,
        F: FnOnce(&mut E) -> TouchlineResult<()>,
    {
        let id = id.to_string();
        self.update_collection::<E, _, _>(move |collection| {
            let mut record = collection
                .get(&id)
                .cloned()
                .ok_or_else(|| not_found::<E>(&id))?;
            change(&mut record)?;
            record.validate().map_err(TouchlineError::ValidationFailed)?;
            collection.insert(id, record.clone());
            Ok(record)
        })
        .await
    }

    /// Remove one record by id, failing with `NotFound` if it isn't there
    pub async fn remove<E: Entity>(&self, id: &str) -> TouchlineResult<E> {
        let id = id.to_string();
        self.update_collection::<E, _, _>(move |collection| {
            collection.remove(&id).ok_or_else(|| not_found::<E>(&id))
        })
        .await
    }
}

pub(crate) fn not_found<E: Entity>(id: &str) -> TouchlineError {
    TouchlineError::NotFound {
        entity_type: E::KIND,
        identifier: id.to_string(),
    }
}

fn check_guard(guard: &KeyLockGuard, key: StorageKey) -> TouchlineResult<()> {
    if guard.key() == key.as_str() {
        Ok(())
    } else {
        Err(TouchlineError::Config(format!(
            "lock on '{}' does not cover '{}'",
            guard.key(),
            key
        )))
    }
}
