//! Backup document format and whole-state export

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{TouchlineError, TouchlineResult};
use crate::models::{
    AppSettings, Collection, Entity, Personnel, Player, PlayerStatAdjustment, SavedGame, Season,
    Team, Tournament,
};
use crate::services::EntityStore;
use crate::storage::{ReadMode, StorageKey};

/// Version written into every export; imports accept only this version
pub const FORMAT_VERSION: u32 = 1;

/// Self-describing export of every managed collection
///
/// Collections are keyed by collection name (`games`, `roster`, ...) and
/// hold plain record arrays. `settings` holds a one-element array.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub format_version: u32,
    /// Files written by hand or by older exporters may omit this
    #[serde(default = "Utc::now")]
    pub exported_at: DateTime<Utc>,
    pub collections: BTreeMap<String, Vec<Value>>,
}

impl BackupDocument {
    pub fn record_count(&self) -> usize {
        self.collections.values().map(Vec::len).sum()
    }

    /// Parse a document, rejecting unsupported format versions before
    /// looking at anything else
    pub fn parse(text: &str) -> TouchlineResult<Self> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Header {
            format_version: Option<u32>,
        }

        let header: Header = serde_json::from_str(text)
            .map_err(|e| TouchlineError::ValidationFailed(format!("not a backup document: {}", e)))?;
        match header.format_version {
            Some(FORMAT_VERSION) => {}
            Some(other) => {
                return Err(TouchlineError::ValidationFailed(format!(
                    "unsupported backup format version {} (expected {})",
                    other, FORMAT_VERSION
                )))
            }
            None => {
                return Err(TouchlineError::ValidationFailed(
                    "backup document has no formatVersion".into(),
                ))
            }
        }

        serde_json::from_str(text)
            .map_err(|e| TouchlineError::ValidationFailed(format!("malformed backup document: {}", e)))
    }
}

/// Export every managed collection, reading each in strict mode under its lock
///
/// Corrupt stored data fails the export with `CorruptData` rather than
/// producing a backup with silently emptied collections.
pub async fn export_document(store: &EntityStore) -> TouchlineResult<BackupDocument> {
    let mut collections = BTreeMap::new();
    for key in StorageKey::ENTITY_KEYS {
        let records = export_key(store, key).await?;
        collections.insert(key.collection_name().to_string(), records);
    }

    let document = BackupDocument {
        format_version: FORMAT_VERSION,
        exported_at: Utc::now(),
        collections,
    };
    tracing::info!(records = document.record_count(), "exported all collections");
    Ok(document)
}

async fn export_key(store: &EntityStore, key: StorageKey) -> TouchlineResult<Vec<Value>> {
    match key {
        StorageKey::Teams => export_collection::<Team>(store).await,
        StorageKey::Seasons => export_collection::<Season>(store).await,
        StorageKey::Tournaments => export_collection::<Tournament>(store).await,
        StorageKey::MasterRoster => export_collection::<Player>(store).await,
        StorageKey::Personnel => export_collection::<Personnel>(store).await,
        StorageKey::SavedGames => export_collection::<SavedGame>(store).await,
        StorageKey::PlayerAdjustments => export_collection::<PlayerStatAdjustment>(store).await,
        StorageKey::AppSettings => {
            let _guard = store.locks().acquire(key.as_str()).await?;
            let settings: AppSettings = store.load(key, ReadMode::Strict).await?;
            Ok(vec![serde_json::to_value(settings)?])
        }
        StorageKey::MigrationStatus => Ok(Vec::new()),
    }
}

async fn export_collection<E: Entity>(store: &EntityStore) -> TouchlineResult<Vec<Value>> {
    let _guard = store.locks().acquire(E::KEY.as_str()).await?;
    let collection: Collection<E> = store.load(E::KEY, ReadMode::Strict).await?;
    collection
        .into_values()
        .map(|record| serde_json::to_value(record).map_err(TouchlineError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{StoreConfig, TouchlinePaths};
    use crate::services::TeamService;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, EntityStore) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TouchlinePaths::with_base_dir(temp_dir.path().to_path_buf());
        let store = EntityStore::open(paths, &StoreConfig::default());
        (temp_dir, store)
    }

    #[tokio::test]
    async fn test_export_lists_every_collection() {
        let (_temp_dir, store) = create_test_store();
        TeamService::new(&store).create("Alpha").await.unwrap();

        let document = export_document(&store).await.unwrap();

        assert_eq!(document.format_version, FORMAT_VERSION);
        let names: Vec<_> = document.collections.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            vec!["adjustments", "games", "personnel", "roster", "seasons", "settings", "teams", "tournaments"]
        );
        assert_eq!(document.collections["teams"].len(), 1);
        assert_eq!(document.collections["settings"].len(), 1);
        assert_eq!(document.collections["teams"][0]["name"], "Alpha");
    }

    #[tokio::test]
    async fn test_export_refuses_corrupt_data() {
        let (_temp_dir, store) = create_test_store();
        let adapter = store.adapter().await.unwrap();
        adapter
            .set(StorageKey::Seasons.as_str(), "[not valid".into())
            .await
            .unwrap();

        let err = export_document(&store).await.unwrap_err();
        assert!(matches!(err, TouchlineError::CorruptData { ref key, .. } if key == "soccerSeasons"));
    }

    #[test]
    fn test_parse_checks_version_first() {
        let future = r#"{"formatVersion": 2, "collections": "different shape"}"#;
        let err = BackupDocument::parse(future).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("unsupported"));

        let missing = r#"{"collections": {}}"#;
        assert!(BackupDocument::parse(missing).unwrap_err().is_validation());

        let ok = r#"{"formatVersion": 1, "exportedAt": "2026-01-01T00:00:00Z", "collections": {}}"#;
        assert_eq!(BackupDocument::parse(ok).unwrap().record_count(), 0);
    }

    #[test]
    fn test_parse_without_export_time() {
        let text = r#"{"formatVersion":1,"collections":{"teams":[{"id":"team_1","name":"Alpha"}]}}"#;
        let document = BackupDocument::parse(text).unwrap();
        assert_eq!(document.format_version, FORMAT_VERSION);
        assert_eq!(document.record_count(), 1);
    }
}
