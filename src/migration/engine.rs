//! Migration engine
//!
//! Every legacy value is decoded into its typed collection before it is
//! written, so a value the services could not read aborts the run instead of
//! being carried over. While the last attempt is rolled back the services read
//! and write the legacy store directly.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use super::snapshot::{canonical_checksum, MigrationBackup};
use super::status::{MigrationState, MigrationStatus};
use crate::config::{StoreConfig, TouchlinePaths};
use crate::error::{TouchlineError, TouchlineResult};
use crate::lock::KeyLockGuard;
use crate::models::{
    AppSettings, Collection, Entity, Personnel, Player, PlayerStatAdjustment, SavedGame, Season,
    Team, Tournament, Validate,
};
use crate::services::EntityStore;
use crate::storage::{
    decode, encode, read_value, write_value, LegacyFileStore, ReadMode, StorageAdapter, StorageKey,
};

/// Serializes migration runs within this process
static MIGRATION_LOCK: Mutex<()> = Mutex::const_new(());

const RETRY_BACKOFF: Duration = Duration::from_millis(50);

/// What one run has done so far, for rollback
#[derive(Default)]
struct Attempt {
    state: MigrationState,
    snapshot: Option<MigrationBackup>,
    /// Destination keys written, with the value each held before
    touched: Vec<(StorageKey, Option<String>)>,
    guards: Vec<KeyLockGuard>,
}

impl Attempt {
    fn enter(&mut self, state: MigrationState) {
        tracing::info!(from = %self.state, to = %state, "migration state");
        self.state = state;
    }
}

pub struct MigrationEngine {
    legacy: Arc<dyn StorageAdapter>,
    store: EntityStore,
    backup_dir: PathBuf,
    retry_count: u32,
}

impl MigrationEngine {
    pub fn new(legacy: Arc<dyn StorageAdapter>, store: EntityStore, backup_dir: PathBuf) -> Self {
        Self {
            legacy,
            store,
            backup_dir,
            retry_count: StoreConfig::default().migration_retry_count,
        }
    }

    /// Engine reading the legacy file under `paths`
    pub fn from_config(store: EntityStore, paths: &TouchlinePaths, config: &StoreConfig) -> Self {
        let legacy = Arc::new(LegacyFileStore::new(paths.legacy_file()));
        Self::new(legacy, store, paths.backup_dir()).with_retry_count(config.migration_retry_count)
    }

    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }

    /// Current status as recorded in the configured backend
    pub async fn status(&self) -> TouchlineResult<MigrationStatus> {
        let primary = self.store.factory().primary().await?;
        read_value(primary.as_ref(), StorageKey::MigrationStatus.as_str(), ReadMode::Lenient).await
    }

    /// Migrate once. A completed migration is a no-op that writes nothing.
    ///
    /// The destination is always the configured backend, even while the
    /// legacy store is being served after an earlier rollback.
    pub async fn run(&self) -> TouchlineResult<MigrationStatus> {
        let _running = MIGRATION_LOCK.lock().await;
        let destination = self.store.factory().primary().await?;

        let status = self.status().await?;
        if status.is_complete() {
            tracing::debug!("migration already committed");
            self.store.factory().clear_fallback().await;
            return Ok(status);
        }

        let entries = self.legacy_entries().await?;
        if entries.is_empty() {
            tracing::info!("no legacy data, marking migration complete");
            let status = MigrationStatus::committed();
            self.save_status(destination.as_ref(), &status).await?;
            self.store.factory().clear_fallback().await;
            return Ok(status);
        }

        let mut attempt = Attempt::default();
        match self.migrate(destination.as_ref(), &entries, &mut attempt).await {
            Ok(status) => {
                self.store.factory().clear_fallback().await;
                Ok(status)
            }
            Err(err) => {
                let reason = err.to_string();
                tracing::error!(state = %attempt.state, error = %reason, "migration failed, rolling back");

                let rollback_errors = self.roll_back(destination.as_ref(), &attempt).await;
                let last_error = if rollback_errors.is_empty() {
                    reason
                } else {
                    format!("{} (rollback: {})", reason, rollback_errors.join("; "))
                };

                let status = MigrationStatus::rolled_back(&last_error);
                if let Err(e) = self.save_status(destination.as_ref(), &status).await {
                    tracing::error!(error = %e, "could not record rolled-back migration");
                }
                attempt.enter(MigrationState::RolledBack);
                self.store.factory().use_fallback(Arc::clone(&self.legacy)).await;
                Err(TouchlineError::MigrationFailed(last_error))
            }
        }
    }

    /// Run, retrying rolled-back attempts up to the configured count
    pub async fn run_with_retry(&self) -> TouchlineResult<MigrationStatus> {
        let attempts = self.retry_count.max(1);
        let mut attempt = 1;
        loop {
            match self.run().await {
                Err(TouchlineError::MigrationFailed(reason)) if attempt < attempts => {
                    tracing::warn!(attempt, attempts, reason = %reason, "migration attempt failed, retrying");
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                    attempt += 1;
                }
                outcome => return outcome,
            }
        }
    }

    /// Legacy values for every known entity key, in export order
    async fn legacy_entries(&self) -> TouchlineResult<Vec<(StorageKey, String)>> {
        let mut entries = Vec::new();
        for key in StorageKey::ENTITY_KEYS {
            if let Some(raw) = self.legacy.get(key.as_str()).await? {
                if !raw.trim().is_empty() {
                    entries.push((key, raw));
                }
            }
        }
        Ok(entries)
    }

    async fn migrate(
        &self,
        destination: &dyn StorageAdapter,
        entries: &[(StorageKey, String)],
        attempt: &mut Attempt,
    ) -> TouchlineResult<MigrationStatus> {
        attempt.enter(MigrationState::BackingUp);
        let raw_entries: BTreeMap<String, String> = entries
            .iter()
            .map(|(key, raw)| (key.as_str().to_string(), raw.clone()))
            .collect();
        let snapshot = MigrationBackup::capture(raw_entries)?;
        attempt.snapshot = Some(snapshot.clone());
        let path = snapshot.persist(&self.backup_dir).await?;
        tracing::info!(path = %path.display(), keys = entries.len(), "legacy snapshot written");

        // Hold every destination key until the outcome is decided. Taken in
        // export order, which keeps personnel ahead of saved games.
        for (key, _) in entries {
            let guard = self.store.locks().acquire(key.as_str()).await?;
            attempt.guards.push(guard);
        }

        attempt.enter(MigrationState::Transferring);
        snapshot.verify()?;
        let mut expected = BTreeMap::new();
        for (key, raw) in entries {
            let encoded = transcode(*key, raw)?;
            let checksum = canonical_checksum(&encoded).map_err(|reason| TouchlineError::corrupt(key.as_str(), reason))?;
            let previous = destination.get(key.as_str()).await?;
            attempt.touched.push((*key, previous));
            destination.set(key.as_str(), encoded).await?;
            expected.insert(*key, checksum);
            tracing::debug!(key = %key, "transferred");
        }

        attempt.enter(MigrationState::Verifying);
        for (key, _) in entries {
            let stored = destination.get(key.as_str()).await?.ok_or_else(|| {
                TouchlineError::MigrationFailed(format!("'{}' missing after transfer", key))
            })?;
            let actual = canonical_checksum(&stored).map_err(|reason| TouchlineError::corrupt(key.as_str(), reason))?;
            if expected.get(key) != Some(&actual) {
                return Err(TouchlineError::MigrationFailed(format!(
                    "checksum mismatch for '{}'",
                    key
                )));
            }
            transcode(*key, &stored)?;
        }

        let status = MigrationStatus::committed();
        self.save_status(destination, &status).await?;
        attempt.enter(MigrationState::Committed);
        attempt.guards.clear();

        // The new backend holds verified copies; the legacy values can go
        for (key, _) in entries {
            if let Err(e) = self.legacy.remove(key.as_str()).await {
                tracing::warn!(key = %key, error = %e, "could not clear legacy value");
            }
        }

        tracing::info!(keys = entries.len(), "migration committed");
        Ok(status)
    }

    /// Undo an attempt. Returns a description of every step that failed.
    async fn roll_back(&self, destination: &dyn StorageAdapter, attempt: &Attempt) -> Vec<String> {
        let mut errors = Vec::new();

        if let Some(snapshot) = &attempt.snapshot {
            match snapshot.verify() {
                Ok(()) => {
                    for (key, raw) in &snapshot.entries {
                        let unchanged = matches!(self.legacy.get(key).await, Ok(Some(current)) if current == *raw);
                        if unchanged {
                            continue;
                        }
                        if let Err(e) = self.legacy.set(key, raw.clone()).await {
                            errors.push(format!("legacy '{}': {}", key, e));
                        }
                    }
                }
                Err(e) => errors.push(format!("snapshot unusable: {}", e)),
            }
        }

        for (key, previous) in attempt.touched.iter().rev() {
            let restored = match previous {
                Some(value) => destination.set(key.as_str(), value.clone()).await,
                None => destination.remove(key.as_str()).await,
            };
            if let Err(e) = restored {
                errors.push(format!("'{}': {}", key, e));
            }
        }

        for error in &errors {
            tracing::error!(error = %error, "rollback step failed");
        }
        errors
    }

    async fn save_status(&self, destination: &dyn StorageAdapter, status: &MigrationStatus) -> TouchlineResult<()> {
        write_value(destination, StorageKey::MigrationStatus.as_str(), status).await
    }
}

/// Decode a legacy value strictly into the type stored under `key` and
/// re-encode it for the new backend
fn transcode(key: StorageKey, raw: &str) -> TouchlineResult<String> {
    match key {
        StorageKey::SavedGames => transcode_collection::<SavedGame>(raw),
        StorageKey::MasterRoster => transcode_collection::<Player>(raw),
        StorageKey::Seasons => transcode_collection::<Season>(raw),
        StorageKey::Tournaments => transcode_collection::<Tournament>(raw),
        StorageKey::Teams => transcode_collection::<Team>(raw),
        StorageKey::Personnel => transcode_collection::<Personnel>(raw),
        StorageKey::PlayerAdjustments => transcode_collection::<PlayerStatAdjustment>(raw),
        StorageKey::AppSettings => {
            let settings: AppSettings = decode(key.as_str(), Some(raw), ReadMode::Strict)?;
            encode(key.as_str(), &settings)
        }
        StorageKey::MigrationStatus => Err(TouchlineError::MigrationFailed(
            "migration status is not legacy data".into(),
        )),
    }
}

fn transcode_collection<E: Entity>(raw: &str) -> TouchlineResult<String> {
    let key = E::KEY.as_str();
    let mut records: Collection<E> =
        serde_json::from_str(raw).map_err(|e| TouchlineError::corrupt(key, e.to_string()))?;
    records.values_mut().for_each(E::normalize);
    records
        .validate()
        .map_err(|reason| TouchlineError::corrupt(key, reason))?;
    encode(key, &records)
}
