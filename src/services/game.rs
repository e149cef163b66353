//! Saved game service
//!
//! Games are stored as whole snapshots. Event edits load the game, change
//! the event list, re-derive every event's `order`, and write the full game
//! back, all under the saved-games lock.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::settings::SettingsService;
use super::store::EntityStore;
use crate::error::{TouchlineError, TouchlineResult};
use crate::models::{
    GameEvent, HomeOrAway, PersonnelId, PlayerId, SavedGame, SeasonId, TeamId, TournamentId,
    Validate,
};

/// Game header fields that may change after creation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamePatch {
    pub team_name: Option<String>,
    pub opponent_name: Option<String>,
    pub game_date: Option<NaiveDate>,
    pub home_or_away: Option<HomeOrAway>,
    pub season_id: Option<SeasonId>,
    pub tournament_id: Option<TournamentId>,
    pub team_id: Option<TeamId>,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub is_played: Option<bool>,
    pub selected_player_ids: Option<Vec<PlayerId>>,
    pub personnel_ids: Option<Vec<PersonnelId>>,
}

impl GamePatch {
    fn apply_to(self, game: &mut SavedGame) {
        if let Some(name) = self.team_name {
            game.team_name = name.trim().to_string();
        }
        if let Some(name) = self.opponent_name {
            game.opponent_name = name.trim().to_string();
        }
        if self.game_date.is_some() {
            game.game_date = self.game_date;
        }
        if let Some(side) = self.home_or_away {
            game.home_or_away = side;
        }
        if self.season_id.is_some() {
            game.season_id = self.season_id;
        }
        if self.tournament_id.is_some() {
            game.tournament_id = self.tournament_id;
        }
        if self.team_id.is_some() {
            game.team_id = self.team_id;
        }
        if let Some(score) = self.home_score {
            game.home_score = score;
        }
        if let Some(score) = self.away_score {
            game.away_score = score;
        }
        if let Some(played) = self.is_played {
            game.is_played = played;
        }
        if let Some(players) = self.selected_player_ids {
            game.selected_player_ids = players;
        }
        if let Some(personnel) = self.personnel_ids {
            game.personnel_ids = personnel;
        }
        game.updated_at = Utc::now();
    }
}

/// Service for saved games and their event logs
pub struct GameService<'a> {
    store: &'a EntityStore,
}

impl<'a> GameService<'a> {
    pub fn new(store: &'a EntityStore) -> Self {
        Self { store }
    }

    /// All games, newest first
    pub async fn list(&self) -> TouchlineResult<Vec<SavedGame>> {
        let mut games = self.store.list::<SavedGame>().await?;
        games.sort_by(|a, b| {
            b.game_date
                .cmp(&a.game_date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(games)
    }

    pub async fn get_by_id(&self, id: &str) -> TouchlineResult<Option<SavedGame>> {
        self.store.get::<SavedGame>(id).await
    }

    pub async fn games_for_season(&self, season_id: &str) -> TouchlineResult<Vec<SavedGame>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|g| g.season_id.as_ref().is_some_and(|id| id == season_id))
            .collect())
    }

    pub async fn games_for_tournament(&self, tournament_id: &str) -> TouchlineResult<Vec<SavedGame>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|g| g.tournament_id.as_ref().is_some_and(|id| id == tournament_id))
            .collect())
    }

    /// Store a new game. Fails if a game with the same id already exists.
    pub async fn create(&self, mut game: SavedGame) -> TouchlineResult<SavedGame> {
        game.reindex_events();
        game.validate().map_err(TouchlineError::ValidationFailed)?;

        let created = self
            .store
            .update_collection::<SavedGame, _, _>(move |games| {
                if games.contains_key(game.id.as_str()) {
                    return Err(TouchlineError::ValidationFailed(format!(
                        "game id '{}' already exists",
                        game.id
                    )));
                }
                games.insert(game.id.to_string(), game.clone());
                Ok(game)
            })
            .await?;

        tracing::debug!(game = %created.id, "game created");
        Ok(created)
    }

    /// Insert or replace a full game snapshot
    pub async fn save_game(&self, mut game: SavedGame) -> TouchlineResult<SavedGame> {
        game.reindex_events();
        game.updated_at = Utc::now();
        game.validate().map_err(TouchlineError::ValidationFailed)?;

        self.store
            .update_collection::<SavedGame, _, _>(move |games| {
                games.insert(game.id.to_string(), game.clone());
                Ok(game)
            })
            .await
    }

    pub async fn update(&self, id: &str, patch: GamePatch) -> TouchlineResult<SavedGame> {
        self.store
            .modify::<SavedGame, _>(id, move |game| {
                patch.apply_to(game);
                Ok(())
            })
            .await
    }

    /// Delete a game, clearing it as the current game if it was one
    pub async fn remove(&self, id: &str) -> TouchlineResult<SavedGame> {
        let removed = self.store.remove::<SavedGame>(id).await?;

        // Separate lock, taken after the games lock is released
        SettingsService::new(self.store)
            .clear_current_game_if(removed.id.as_str())
            .await?;

        tracing::info!(game = %removed.id, "game removed");
        Ok(removed)
    }

    /// Add an event at `position` (appended when `None`)
    pub async fn add_game_event(
        &self,
        game_id: &str,
        event: GameEvent,
        position: Option<usize>,
    ) -> TouchlineResult<SavedGame> {
        self.store
            .modify::<SavedGame, _>(game_id, move |game| {
                game.add_event(event, position)
                    .map(|_| ())
                    .map_err(TouchlineError::ValidationFailed)
            })
            .await
    }

    pub async fn update_game_event(
        &self,
        game_id: &str,
        index: usize,
        event: GameEvent,
    ) -> TouchlineResult<SavedGame> {
        self.store
            .modify::<SavedGame, _>(game_id, move |game| {
                game.update_event(index, event)
                    .map_err(TouchlineError::ValidationFailed)
            })
            .await
    }

    pub async fn remove_game_event(&self, game_id: &str, index: usize) -> TouchlineResult<SavedGame> {
        self.store
            .modify::<SavedGame, _>(game_id, move |game| {
                game.remove_event(index)
                    .map(|_| ())
                    .map_err(TouchlineError::ValidationFailed)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{StoreConfig, TouchlinePaths};
    use crate::models::GameEventType;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, EntityStore) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TouchlinePaths::with_base_dir(temp_dir.path().to_path_buf());
        let store = EntityStore::open(paths, &StoreConfig::default());
        (temp_dir, store)
    }

    async fn game_with_three_events(service: &GameService<'_>) -> SavedGame {
        let mut game = SavedGame::new("Alpha", "Beta");
        let scorer = PlayerId::from("player_1");
        game.events = vec![
            GameEvent::goal(10, scorer.clone()),
            GameEvent::goal(20, scorer),
            GameEvent::new(GameEventType::Substitution, 30),
        ];
        service.create(game).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_reindexes_events() {
        let (_temp_dir, store) = create_test_store();
        let service = GameService::new(&store);

        let game = game_with_three_events(&service).await;
        assert!(game.has_contiguous_order());
        assert_eq!(game.events[2].order, 2);
    }

    #[tokio::test]
    async fn test_remove_event_persists_reindexed_list() {
        let (_temp_dir, store) = create_test_store();
        let service = GameService::new(&store);
        let game = game_with_three_events(&service).await;

        service.remove_game_event(game.id.as_str(), 1).await.unwrap();

        let stored = service.get_by_id(game.id.as_str()).await.unwrap().unwrap();
        let orders: Vec<_> = stored.events.iter().map(|e| e.order).collect();
        let times: Vec<_> = stored.events.iter().map(|e| e.time).collect();
        assert_eq!(orders, vec![0, 1]);
        assert_eq!(times, vec![10, 30]);
    }

    #[tokio::test]
    async fn test_event_index_out_of_range() {
        let (_temp_dir, store) = create_test_store();
        let service = GameService::new(&store);
        let game = game_with_three_events(&service).await;

        let err = service.remove_game_event(game.id.as_str(), 7).await.unwrap_err();
        assert!(err.is_validation());

        let stored = service.get_by_id(game.id.as_str()).await.unwrap().unwrap();
        assert_eq!(stored.events.len(), 3);
    }

    #[tokio::test]
    async fn test_update_event_keeps_position() {
        let (_temp_dir, store) = create_test_store();
        let service = GameService::new(&store);
        let game = game_with_three_events(&service).await;

        let replacement = GameEvent::new(GameEventType::OpponentGoal, 25);
        let updated = service
            .update_game_event(game.id.as_str(), 1, replacement.clone())
            .await
            .unwrap();

        assert_eq!(updated.events[1].id, replacement.id);
        assert_eq!(updated.events[1].order, 1);
    }

    #[tokio::test]
    async fn test_concurrent_event_appends() {
        let (_temp_dir, store) = create_test_store();
        let game = GameService::new(&store)
            .create(SavedGame::new("Alpha", "Beta"))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for minute in 0..10u32 {
            let store = store.clone();
            let game_id = game.id.to_string();
            handles.push(tokio::spawn(async move {
                GameService::new(&store)
                    .add_game_event(
                        &game_id,
                        GameEvent::new(GameEventType::Substitution, minute * 60),
                        None,
                    )
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stored = GameService::new(&store)
            .get_by_id(game.id.as_str())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.events.len(), 10);
        assert!(stored.has_contiguous_order());
    }

    #[tokio::test]
    async fn test_update_header_and_filters() {
        let (_temp_dir, store) = create_test_store();
        let service = GameService::new(&store);
        let game = service.create(SavedGame::new("Alpha", "Beta")).await.unwrap();
        service.create(SavedGame::new("Alpha", "Gamma")).await.unwrap();

        let updated = service
            .update(
                game.id.as_str(),
                GamePatch {
                    home_score: Some(2),
                    is_played: Some(true),
                    season_id: Some(SeasonId::from("season_1")),
                    ..GamePatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.home_score, 2);
        assert!(updated.is_played);

        let in_season = service.games_for_season("season_1").await.unwrap();
        assert_eq!(in_season.len(), 1);
        assert_eq!(in_season[0].id, game.id);
        assert!(service.games_for_tournament("tournament_1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_clears_current_game() {
        let (_temp_dir, store) = create_test_store();
        let service = GameService::new(&store);
        let settings = SettingsService::new(&store);

        let game = service.create(SavedGame::new("Alpha", "Beta")).await.unwrap();
        settings.set_current_game_id(Some(game.id.clone())).await.unwrap();

        service.remove(game.id.as_str()).await.unwrap();

        assert!(settings.get().await.unwrap().current_game_id.is_none());
        assert!(service.remove(game.id.as_str()).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_save_game_upserts() {
        let (_temp_dir, store) = create_test_store();
        let service = GameService::new(&store);

        let mut game = SavedGame::new("Alpha", "Beta");
        service.save_game(game.clone()).await.unwrap();

        game.away_score = 3;
        service.save_game(game.clone()).await.unwrap();

        let games = service.list().await.unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].away_score, 3);
    }
}
