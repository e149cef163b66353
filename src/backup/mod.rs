//! Backup and restore for Touchline
//!
//! # Architecture
//!
//! - `export_document`: reads every managed collection (strict mode, under
//!   each collection's lock) into one self-describing `BackupDocument`
//! - `RestoreManager`: validates a document and imports it record by record
//! - `BackupManager`: writes dated exports to the backup directory and keeps
//!   the most recent ones
//!
//! # Backup Format
//!
//! ```json
//! {
//!   "formatVersion": 1,
//!   "exportedAt": "2026-03-01T10:00:00Z",
//!   "collections": { "teams": [ ... ], "settings": [ { ... } ] }
//! }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use touchline::backup::{BackupManager, RestoreManager};
//!
//! let manager = BackupManager::new(store.clone(), paths.backup_dir(), 10);
//! let (backup_path, _deleted) = manager.create_backup_with_retention().await?;
//!
//! let result = RestoreManager::new(&store).import_file(&backup_path).await?;
//! println!("{}", result.summary());
//! ```

mod document;
mod manager;
mod restore;

pub use document::{export_document, BackupDocument, FORMAT_VERSION};
pub use manager::{BackupInfo, BackupManager};
pub use restore::{ImportResult, RestoreManager, SkippedRecord, ValidationResult};
