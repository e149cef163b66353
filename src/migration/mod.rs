//! One-shot migration from the legacy flat store to the current backend
//!
//! A run moves through `BackingUp -> Transferring -> Verifying -> Committed`.
//! Any failure before the commit point restores both stores from the snapshot
//! and ends in `RolledBack`, leaving the legacy store authoritative so the run
//! can be retried.
//!
//! Runs inside one process are serialized. Two processes migrating the same
//! data directory at once are not coordinated.

mod engine;
mod snapshot;
mod status;

pub use engine::MigrationEngine;
pub use snapshot::{canonical_checksum, MigrationBackup};
pub use status::{MigrationState, MigrationStatus};
