//! Storage layer for Touchline
//!
//! A narrow adapter interface with file, memory and legacy backends, a factory
//! that owns the adapter lifecycle, and the codec that turns stored strings
//! into validated collections.

pub mod adapter;
pub mod codec;
pub mod factory;
pub mod file;
pub mod file_io;
pub mod legacy;
pub mod memory;

pub use adapter::StorageAdapter;
pub use codec::{decode, encode, read_value, write_value, ReadMode};
pub use factory::StorageFactory;
pub use file::FileAdapter;
pub use legacy::LegacyFileStore;
pub use memory::MemoryAdapter;

use std::fmt;

/// Storage key of each persisted collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StorageKey {
    SavedGames,
    MasterRoster,
    Seasons,
    Tournaments,
    Teams,
    Personnel,
    AppSettings,
    PlayerAdjustments,
    MigrationStatus,
}

impl StorageKey {
    /// Every key holding entity data, in export order
    pub const ENTITY_KEYS: [StorageKey; 8] = [
        StorageKey::Teams,
        StorageKey::Seasons,
        StorageKey::Tournaments,
        StorageKey::MasterRoster,
        StorageKey::Personnel,
        StorageKey::SavedGames,
        StorageKey::PlayerAdjustments,
        StorageKey::AppSettings,
    ];

    /// The string the backend stores the collection under
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SavedGames => "savedSoccerGames",
            Self::MasterRoster => "soccerMasterRoster",
            Self::Seasons => "soccerSeasons",
            Self::Tournaments => "soccerTournaments",
            Self::Teams => "soccerTeamsIndex",
            Self::Personnel => "soccerPersonnel",
            Self::AppSettings => "soccerAppSettings",
            Self::PlayerAdjustments => "soccerPlayerAdjustments",
            Self::MigrationStatus => "migrationStatus",
        }
    }

    /// Name used for the collection in backup documents
    pub fn collection_name(self) -> &'static str {
        match self {
            Self::SavedGames => "games",
            Self::MasterRoster => "roster",
            Self::Seasons => "seasons",
            Self::Tournaments => "tournaments",
            Self::Teams => "teams",
            Self::Personnel => "personnel",
            Self::AppSettings => "settings",
            Self::PlayerAdjustments => "adjustments",
            Self::MigrationStatus => "migrationStatus",
        }
    }

    pub fn from_str_key(key: &str) -> Option<Self> {
        Self::ENTITY_KEYS
            .into_iter()
            .chain([Self::MigrationStatus])
            .find(|k| k.as_str() == key)
    }

    pub fn from_collection_name(name: &str) -> Option<Self> {
        Self::ENTITY_KEYS
            .into_iter()
            .find(|k| k.collection_name() == name)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
