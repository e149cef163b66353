//! Core data models for Touchline
//!
//! Every entity type is persisted as one collection under one storage key,
//! keyed internally by entity id.

pub mod adjustment;
pub mod game;
pub mod ids;
pub mod personnel;
pub mod player;
pub mod season;
pub mod settings;
pub mod team;
pub mod tournament;

pub use adjustment::PlayerStatAdjustment;
pub use game::{GameEvent, GameEventType, HomeOrAway, SavedGame};
pub use ids::{AdjustmentId, EventId, GameId, PersonnelId, PlayerId, SeasonId, TeamId, TournamentId};
pub use personnel::{Personnel, PersonnelRole};
pub use player::Player;
pub use season::Season;
pub use settings::AppSettings;
pub use team::Team;
pub use tournament::Tournament;

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

use crate::storage::StorageKey;

/// Longest accepted display name
pub const MAX_NAME_LEN: usize = 100;

/// Schema check applied before every write and after every read
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

/// A record stored in an id-keyed collection
pub trait Entity: Serialize + DeserializeOwned + Validate + Clone + Send + Sync + 'static {
    /// Human-readable type name for errors
    const KIND: &'static str;
    const KEY: StorageKey;

    fn id(&self) -> &str;

    /// Repair derived fields on a record that arrived from outside the
    /// services (import, legacy data) before it is validated
    fn normalize(&mut self) {}
}

/// Entities whose names must be unique within their collection
pub trait Named: Entity {
    fn name(&self) -> &str;
}

/// Id-keyed collection as persisted under one storage key
pub type Collection<T> = BTreeMap<String, T>;

impl<T: Entity> Validate for BTreeMap<String, T> {
    fn validate(&self) -> Result<(), String> {
        for (id, record) in self {
            if record.id() != id {
                return Err(format!(
                    "{} stored under '{}' has id '{}'",
                    T::KIND,
                    id,
                    record.id()
                ));
            }
            record
                .validate()
                .map_err(|reason| format!("{} '{}': {}", T::KIND, id, reason))?;
        }
        Ok(())
    }
}

/// Comparison form of a name: NFKC-normalized, trimmed, lowercased
pub fn normalize_name(name: &str) -> String {
    name.nfkc().collect::<String>().trim().to_lowercase()
}

/// Shared display-name rule
pub fn validate_name(name: &str) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("name cannot be empty".into());
    }
    let len = trimmed.chars().count();
    if len > MAX_NAME_LEN {
        return Err(format!("name too long ({} chars, max {})", len, MAX_NAME_LEN));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Alpha"), normalize_name("ALPHA "));
        assert_eq!(normalize_name("  FC Köln"), "fc köln");
        // Fullwidth letters fold to ASCII under NFKC
        assert_eq!(normalize_name("ＡＬＰＨＡ"), "alpha");
        // Precomposed and decomposed forms compare equal
        assert_eq!(normalize_name("Caf\u{e9}"), normalize_name("Cafe\u{301}"));
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Alpha").is_ok());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(101)).is_err());
        assert!(validate_name(&"é".repeat(100)).is_ok());
    }

    #[test]
    fn test_collection_rejects_mismatched_id() {
        let team = Team::new("Alpha");
        let mut collection = Collection::new();
        collection.insert("someone_else".to_string(), team);
        assert!(collection.validate().is_err());
    }
}
