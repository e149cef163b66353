//! Store-wide CLI commands: status, migration, export and import

use std::path::Path;

use crate::backup::{export_document, RestoreManager};
use crate::config::{StoreConfig, TouchlinePaths};
use crate::display::{format_collection_counts, format_migration_status};
use crate::error::{TouchlineError, TouchlineResult};
use crate::migration::{MigrationEngine, MigrationState};
use crate::models::{
    Entity, Personnel, Player, PlayerStatAdjustment, SavedGame, Season, Team, Tournament,
};
use crate::services::EntityStore;
use crate::storage::file_io::{run_blocking, write_atomic};

/// Show backend, migration state and record counts
pub async fn handle_status(store: &EntityStore, engine: &MigrationEngine) -> TouchlineResult<()> {
    let backend = store.factory().backend_name().await?;
    let status = engine.status().await?;

    println!("Touchline Status");
    println!("================");
    println!("Backend: {}", backend);
    print!("{}", format_migration_status(&status));
    println!();
    println!("Records:");

    let counts = [
        ("teams", count::<Team>(store).await?),
        ("seasons", count::<Season>(store).await?),
        ("tournaments", count::<Tournament>(store).await?),
        ("roster", count::<Player>(store).await?),
        ("personnel", count::<Personnel>(store).await?),
        ("games", count::<SavedGame>(store).await?),
        ("adjustments", count::<PlayerStatAdjustment>(store).await?),
    ];
    print!("{}", format_collection_counts(&counts));

    Ok(())
}

async fn count<E: Entity>(store: &EntityStore) -> TouchlineResult<usize> {
    Ok(store.load_collection::<E>().await?.len())
}

/// Run the legacy migration now, retrying transient failures
pub async fn handle_migrate(engine: &MigrationEngine) -> TouchlineResult<()> {
    let before = engine.status().await?;
    if before.is_complete() {
        println!("Migration already complete.");
        return Ok(());
    }

    let status = engine.run_with_retry().await?;
    match status.state {
        MigrationState::Committed => println!("Migration complete."),
        _ => print!("{}", format_migration_status(&status)),
    }
    Ok(())
}

/// Write every collection to a single JSON document
pub async fn handle_export(store: &EntityStore, file: &Path) -> TouchlineResult<()> {
    let document = export_document(store).await?;
    let json = serde_json::to_string_pretty(&document)
        .map_err(|e| TouchlineError::Json(format!("Failed to serialize export: {}", e)))?;

    let target = file.to_path_buf();
    run_blocking(move || write_atomic(target, &json)).await?;

    println!(
        "Exported {} record(s) to {}",
        document.record_count(),
        file.display()
    );
    Ok(())
}

/// Import a document produced by `export`, or only check it
pub async fn handle_import(store: &EntityStore, file: &Path, check: bool) -> TouchlineResult<()> {
    let manager = RestoreManager::new(store);

    if check {
        let validation = manager.validate_file(file).await?;
        println!("Backup Information");
        println!("==================");
        println!("File: {}", file.display());
        println!(
            "Exported: {}",
            validation.exported_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        println!("Format version: {}", validation.format_version);
        println!("Status: {}", validation.summary());
        return Ok(());
    }

    let result = manager.import_file(file).await?;
    println!("{}", result.summary());
    for skipped in &result.skipped {
        println!("  skipped {}", skipped);
    }
    Ok(())
}

pub fn handle_config(paths: &TouchlinePaths, config: &StoreConfig) {
    println!("Touchline Configuration");
    println!("=======================");
    println!("Base directory:   {}", paths.base_dir().display());
    println!("Data directory:   {}", paths.data_dir().display());
    println!("Backup directory: {}", paths.backup_dir().display());
    println!("Legacy file:      {}", paths.legacy_file().display());
    println!();
    println!("Settings:");
    println!("  Backend:          {:?}", config.backend);
    println!("  Lock timeout:     {}ms", config.lock_timeout_ms);
    println!("  Migration retries: {}", config.migration_retry_count);
    println!("  Backups kept:     {}", config.backup_retention);
}
