//! Master roster service

use super::store::EntityStore;
use crate::error::{TouchlineError, TouchlineResult};
use crate::models::player::PlayerPatch;
use crate::models::{Player, Validate};

/// Service for the master roster
pub struct RosterService<'a> {
    store: &'a EntityStore,
}

impl<'a> RosterService<'a> {
    pub fn new(store: &'a EntityStore) -> Self {
        Self { store }
    }

    /// Every player, sorted by name
    pub async fn list(&self) -> TouchlineResult<Vec<Player>> {
        let mut players = self.store.list::<Player>().await?;
        players.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(players)
    }

    pub async fn get_by_id(&self, id: &str) -> TouchlineResult<Option<Player>> {
        self.store.get::<Player>(id).await
    }

    /// Add a player. Roster names need not be unique.
    pub async fn add_player(&self, name: &str, jersey_number: Option<&str>) -> TouchlineResult<Player> {
        let mut player = Player::new(name);
        player.jersey_number = jersey_number.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        self.create(player).await
    }

    pub async fn create(&self, player: Player) -> TouchlineResult<Player> {
        player.validate().map_err(TouchlineError::ValidationFailed)?;
        self.store
            .update_collection::<Player, _, _>(move |roster| {
                if roster.contains_key(player.id.as_str()) {
                    return Err(TouchlineError::ValidationFailed(format!(
                        "player id '{}' already exists",
                        player.id
                    )));
                }
                roster.insert(player.id.to_string(), player.clone());
                Ok(player)
            })
            .await
    }

    pub async fn update(&self, id: &str, patch: PlayerPatch) -> TouchlineResult<Player> {
        self.store
            .modify::<Player, _>(id, move |player| {
                player.apply(patch);
                Ok(())
            })
            .await
    }

    pub async fn set_goalie(&self, id: &str, is_goalie: bool) -> TouchlineResult<Player> {
        self.update(
            id,
            PlayerPatch {
                is_goalie: Some(is_goalie),
                ..PlayerPatch::default()
            },
        )
        .await
    }

    pub async fn set_fair_play_card(&self, id: &str, received: bool) -> TouchlineResult<Player> {
        self.update(
            id,
            PlayerPatch {
                received_fair_play_card: Some(received),
                ..PlayerPatch::default()
            },
        )
        .await
    }

    /// Remove a player from the roster. Saved games keep their player ids.
    pub async fn remove(&self, id: &str) -> TouchlineResult<Player> {
        self.store.remove::<Player>(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{StoreConfig, TouchlinePaths};
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, EntityStore) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TouchlinePaths::with_base_dir(temp_dir.path().to_path_buf());
        let store = EntityStore::open(paths, &StoreConfig::default());
        (temp_dir, store)
    }

    #[tokio::test]
    async fn test_add_and_update_player() {
        let (_temp_dir, store) = create_test_store();
        let service = RosterService::new(&store);

        let sam = service.add_player("Sam", Some("07")).await.unwrap();
        assert_eq!(sam.jersey_number.as_deref(), Some("07"));

        let updated = service.set_goalie(sam.id.as_str(), true).await.unwrap();
        assert!(updated.is_goalie);
        assert_eq!(updated.name, "Sam");

        let carded = service.set_fair_play_card(sam.id.as_str(), true).await.unwrap();
        assert!(carded.is_goalie);
        assert!(carded.received_fair_play_card);
    }

    #[tokio::test]
    async fn test_duplicate_names_allowed() {
        let (_temp_dir, store) = create_test_store();
        let service = RosterService::new(&store);

        service.add_player("Sam", None).await.unwrap();
        service.add_player("Sam", None).await.unwrap();
        assert_eq!(service.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_jersey_rejected() {
        let (_temp_dir, store) = create_test_store();
        let service = RosterService::new(&store);

        let err = service.add_player("Sam", Some("1234")).await.unwrap_err();
        assert!(err.is_validation());
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_player() {
        let (_temp_dir, store) = create_test_store();
        let service = RosterService::new(&store);

        let err = service.set_goalie("player_0_missing", true).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
