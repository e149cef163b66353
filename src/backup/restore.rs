//! Backup restoration
//!
//! Imports are partial-success: every record is checked on its own, bad
//! records are skipped and reported, and the good ones are committed. Each
//! collection present in the document replaces the stored collection under
//! that collection's lock. Collections absent from the document are left
//! untouched.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::{TouchlineError, TouchlineResult};
use crate::models::{
    normalize_name, AppSettings, Collection, Entity, Named, Personnel, Player,
    PlayerStatAdjustment, SavedGame, Season, Team, Tournament, Validate,
};
use crate::services::EntityStore;
use crate::storage::file_io::{read_optional, run_blocking};
use crate::storage::StorageKey;

use super::document::BackupDocument;

/// A record the import left out
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    pub collection: String,
    /// Record id, or `#<index>` when the record has none
    pub id: String,
    pub reason: String,
}

impl fmt::Display for SkippedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}: {}", self.collection, self.id, self.reason)
    }
}

/// Result of an import
#[derive(Debug, Default)]
pub struct ImportResult {
    pub imported: usize,
    pub skipped: Vec<SkippedRecord>,
    pub total: usize,
}

impl ImportResult {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "Imported {} of {} records ({} skipped)",
            self.imported,
            self.total,
            self.skipped.len()
        )
    }

    fn skip(&mut self, collection: &str, id: String, reason: impl Into<String>) {
        let record = SkippedRecord {
            collection: collection.to_string(),
            id,
            reason: reason.into(),
        };
        tracing::warn!(skipped = %record, "import skipped record");
        self.skipped.push(record);
    }
}

/// What a backup file holds, without importing it
#[derive(Debug)]
pub struct ValidationResult {
    pub format_version: u32,
    pub exported_at: DateTime<Utc>,
    /// Record count per collection
    pub collections: BTreeMap<String, usize>,
}

impl ValidationResult {
    pub fn is_complete(&self) -> bool {
        StorageKey::ENTITY_KEYS
            .iter()
            .all(|key| self.collections.contains_key(key.collection_name()))
    }

    pub fn summary(&self) -> String {
        let missing: Vec<_> = StorageKey::ENTITY_KEYS
            .iter()
            .map(|key| key.collection_name())
            .filter(|name| !self.collections.contains_key(*name))
            .collect();

        if missing.is_empty() {
            format!("Complete backup (v{})", self.format_version)
        } else {
            format!(
                "Partial backup (v{}): missing {}",
                self.format_version,
                missing.join(", ")
            )
        }
    }
}

/// Handles importing backup documents
pub struct RestoreManager<'a> {
    store: &'a EntityStore,
}

impl<'a> RestoreManager<'a> {
    pub fn new(store: &'a EntityStore) -> Self {
        Self { store }
    }

    pub async fn import_file(&self, path: &Path) -> TouchlineResult<ImportResult> {
        let document = read_document(path).await?;
        self.import_document(document).await
    }

    /// Check a backup file without importing it
    pub async fn validate_file(&self, path: &Path) -> TouchlineResult<ValidationResult> {
        let document = read_document(path).await?;
        Ok(ValidationResult {
            format_version: document.format_version,
            exported_at: document.exported_at,
            collections: document
                .collections
                .iter()
                .map(|(name, records)| (name.clone(), records.len()))
                .collect(),
        })
    }

    pub async fn import_document(&self, document: BackupDocument) -> TouchlineResult<ImportResult> {
        let mut result = ImportResult::default();

        for (name, records) in document.collections {
            result.total += records.len();
            let Some(key) = StorageKey::from_collection_name(&name) else {
                for (index, record) in records.iter().enumerate() {
                    result.skip(&name, record_id(record, index), "unknown collection");
                }
                continue;
            };

            match key {
                StorageKey::Teams => self.import_named::<Team>(&name, records, &mut result).await?,
                StorageKey::Seasons => self.import_named::<Season>(&name, records, &mut result).await?,
                StorageKey::Tournaments => {
                    self.import_named::<Tournament>(&name, records, &mut result)
                        .await?
                }
                StorageKey::Personnel => {
                    self.import_named::<Personnel>(&name, records, &mut result)
                        .await?
                }
                StorageKey::MasterRoster => self.import_collection::<Player>(&name, records, &mut result).await?,
                StorageKey::SavedGames => {
                    self.import_collection::<SavedGame>(&name, records, &mut result)
                        .await?
                }
                StorageKey::PlayerAdjustments => {
                    self.import_collection::<PlayerStatAdjustment>(&name, records, &mut result)
                        .await?
                }
                StorageKey::AppSettings => self.import_settings(&name, records, &mut result).await?,
                StorageKey::MigrationStatus => {}
            }
        }

        tracing::info!(
            imported = result.imported,
            skipped = result.skipped.len(),
            total = result.total,
            "import finished"
        );
        Ok(result)
    }

    async fn import_collection<E: Entity>(
        &self,
        name: &str,
        records: Vec<Value>,
        result: &mut ImportResult,
    ) -> TouchlineResult<()> {
        let valid = parse_records::<E>(name, records, result, |_| None);
        self.commit(valid, result).await
    }

    /// Like `import_collection`, also skipping records whose name repeats an
    /// earlier record's under normalization
    async fn import_named<E: Named>(
        &self,
        name: &str,
        records: Vec<Value>,
        result: &mut ImportResult,
    ) -> TouchlineResult<()> {
        let mut seen = HashSet::new();
        let valid = parse_records::<E>(name, records, result, |record| {
            if seen.insert(normalize_name(record.name())) {
                None
            } else {
                Some(format!("duplicate name '{}'", record.name()))
            }
        });
        self.commit(valid, result).await
    }

    async fn commit<E: Entity>(&self, valid: Collection<E>, result: &mut ImportResult) -> TouchlineResult<()> {
        let count = valid.len();
        self.store
            .update_collection::<E, _, _>(move |existing| {
                *existing = valid;
                Ok(())
            })
            .await?;
        result.imported += count;
        Ok(())
    }

    async fn import_settings(
        &self,
        name: &str,
        records: Vec<Value>,
        result: &mut ImportResult,
    ) -> TouchlineResult<()> {
        let mut records = records.into_iter().enumerate();
        let Some((_, first)) = records.next() else {
            return Ok(());
        };
        for (index, extra) in records {
            result.skip(name, record_id(&extra, index), "settings hold a single record");
        }

        let settings = match serde_json::from_value::<AppSettings>(first) {
            Ok(settings) => settings,
            Err(e) => {
                result.skip(name, "#0".into(), e.to_string());
                return Ok(());
            }
        };
        if let Err(reason) = settings.validate() {
            result.skip(name, "#0".into(), reason);
            return Ok(());
        }

        self.store
            .update(StorageKey::AppSettings, move |current: &mut AppSettings| {
                *current = settings;
                Ok(())
            })
            .await?;
        result.imported += 1;
        Ok(())
    }
}

/// Decode and validate each record on its own; `reject` may veto a record
/// that is valid by itself
fn parse_records<E: Entity>(
    name: &str,
    records: Vec<Value>,
    result: &mut ImportResult,
    mut reject: impl FnMut(&E) -> Option<String>,
) -> Collection<E> {
    let mut valid = Collection::new();
    for (index, raw) in records.into_iter().enumerate() {
        let id = record_id(&raw, index);
        let mut record = match serde_json::from_value::<E>(raw) {
            Ok(record) => record,
            Err(e) => {
                result.skip(name, id, e.to_string());
                continue;
            }
        };
        record.normalize();
        if let Err(reason) = record.validate() {
            result.skip(name, id, reason);
            continue;
        }
        if valid.contains_key(record.id()) {
            result.skip(name, id, "duplicate id");
            continue;
        }
        if let Some(reason) = reject(&record) {
            result.skip(name, id, reason);
            continue;
        }
        valid.insert(record.id().to_string(), record);
    }
    valid
}

fn record_id(record: &Value, index: usize) -> String {
    record
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{}", index))
}

async fn read_document(path: &Path) -> TouchlineResult<BackupDocument> {
    let target = path.to_path_buf();
    let text = run_blocking(move || read_optional(&target))
        .await?
        .ok_or_else(|| TouchlineError::Io(format!("Backup file not found: {}", path.display())))?;
    BackupDocument::parse(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::document::{export_document, FORMAT_VERSION};
    use crate::config::{StoreConfig, TouchlinePaths};
    use crate::services::{GameService, SettingsService, TeamService};
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, EntityStore) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TouchlinePaths::with_base_dir(temp_dir.path().to_path_buf());
        let store = EntityStore::open(paths, &StoreConfig::default());
        (temp_dir, store)
    }

    fn document(collections: Vec<(&str, Vec<Value>)>) -> BackupDocument {
        BackupDocument {
            format_version: FORMAT_VERSION,
            exported_at: Utc::now(),
            collections: collections
                .into_iter()
                .map(|(name, records)| (name.to_string(), records))
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_partial_import() {
        let (_temp_dir, store) = create_test_store();
        let restore = RestoreManager::new(&store);

        let mut players: Vec<Value> = (0..10)
            .map(|i| json!({ "id": format!("player_{}", i), "name": format!("Player {}", i) }))
            .collect();
        players.push(json!({ "id": "player_bad_name", "name": "   " }));
        players.push(json!({ "name": "No id at all" }));

        let result = restore
            .import_document(document(vec![("roster", players)]))
            .await
            .unwrap();

        assert_eq!(result.imported, 10);
        assert_eq!(result.total, 12);
        assert_eq!(result.skipped.len(), 2);
        assert_eq!(result.skipped[0].id, "player_bad_name");
        assert_eq!(result.skipped[1].id, "#11");
        assert!(result.skipped.iter().all(|s| s.collection == "roster"));

        let roster = store.list::<Player>().await.unwrap();
        assert_eq!(roster.len(), 10);
    }

    #[tokio::test]
    async fn test_absent_collections_untouched() {
        let (_temp_dir, store) = create_test_store();
        TeamService::new(&store).create("Alpha").await.unwrap();

        let players = vec![json!({ "id": "player_1", "name": "Sam" })];
        RestoreManager::new(&store)
            .import_document(document(vec![("roster", players)]))
            .await
            .unwrap();

        assert_eq!(TeamService::new(&store).list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_present_collection_is_replaced() {
        let (_temp_dir, store) = create_test_store();
        TeamService::new(&store).create("Alpha").await.unwrap();

        let teams = vec![json!({ "id": "team_1", "name": "Beta" })];
        RestoreManager::new(&store)
            .import_document(document(vec![("teams", teams)]))
            .await
            .unwrap();

        let names: Vec<_> = TeamService::new(&store)
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["Beta"]);
    }

    #[tokio::test]
    async fn test_duplicate_names_and_ids_skipped() {
        let (_temp_dir, store) = create_test_store();

        let teams = vec![
            json!({ "id": "team_1", "name": "Alpha" }),
            json!({ "id": "team_2", "name": "ALPHA " }),
            json!({ "id": "team_1", "name": "Gamma" }),
        ];
        let result = RestoreManager::new(&store)
            .import_document(document(vec![("teams", teams)]))
            .await
            .unwrap();

        assert_eq!(result.imported, 1);
        let reasons: Vec<_> = result.skipped.iter().map(|s| s.reason.as_str()).collect();
        assert!(reasons[0].starts_with("duplicate name"));
        assert_eq!(reasons[1], "duplicate id");
    }

    #[tokio::test]
    async fn test_imported_game_events_are_reindexed() {
        let (_temp_dir, store) = create_test_store();

        let games = vec![json!({
            "id": "game_1",
            "teamName": "Alpha",
            "opponentName": "Beta",
            "events": [
                { "id": "event_1", "type": "goal", "time": 10, "order": 5 },
                { "id": "event_2", "type": "opponentGoal", "time": 20, "order": 9 }
            ]
        })];
        let result = RestoreManager::new(&store)
            .import_document(document(vec![("games", games)]))
            .await
            .unwrap();
        assert!(result.is_complete());

        let stored = GameService::new(&store).get_by_id("game_1").await.unwrap().unwrap();
        let orders: Vec<_> = stored.events.iter().map(|e| e.order).collect();
        let times: Vec<_> = stored.events.iter().map(|e| e.time).collect();
        assert_eq!(orders, vec![0, 1]);
        assert_eq!(times, vec![10, 20]);
    }

    #[tokio::test]
    async fn test_unknown_collection_reported() {
        let (_temp_dir, store) = create_test_store();

        let result = RestoreManager::new(&store)
            .import_document(document(vec![("widgets", vec![json!({ "id": "w1" })])]))
            .await
            .unwrap();

        assert_eq!(result.imported, 0);
        assert_eq!(result.total, 1);
        assert_eq!(result.skipped[0].reason, "unknown collection");
    }

    #[tokio::test]
    async fn test_settings_import() {
        let (_temp_dir, store) = create_test_store();

        let settings = vec![json!({ "language": "fi", "hasSeenAppGuide": true }), json!({})];
        let result = RestoreManager::new(&store)
            .import_document(document(vec![("settings", settings)]))
            .await
            .unwrap();

        assert_eq!(result.imported, 1);
        assert_eq!(result.skipped.len(), 1);
        let stored = SettingsService::new(&store).get().await.unwrap();
        assert_eq!(stored.language, "fi");
        assert!(stored.has_seen_app_guide);
    }

    #[tokio::test]
    async fn test_export_then_import_into_fresh_store() {
        let (_source_dir, source) = create_test_store();
        TeamService::new(&source).create("Alpha").await.unwrap();
        TeamService::new(&source).create("Beta").await.unwrap();
        let exported = export_document(&source).await.unwrap();

        let (temp_dir, target) = create_test_store();
        let path = temp_dir.path().join("export.json");
        std::fs::write(&path, serde_json::to_string(&exported).unwrap()).unwrap();

        let restore = RestoreManager::new(&target);
        let validation = restore.validate_file(&path).await.unwrap();
        assert!(validation.is_complete());
        assert!(validation.summary().contains("Complete backup"));

        let result = restore.import_file(&path).await.unwrap();
        assert!(result.is_complete());
        assert_eq!(result.imported, result.total);
        assert_eq!(TeamService::new(&target).list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unsupported_version_rejected() {
        let (temp_dir, store) = create_test_store();
        let path = temp_dir.path().join("future.json");
        std::fs::write(&path, r#"{"formatVersion": 9, "collections": {}}"#).unwrap();

        let err = RestoreManager::new(&store).import_file(&path).await.unwrap_err();
        assert!(err.is_validation());
    }
}
