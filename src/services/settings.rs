//! App settings service

use super::store::EntityStore;
use crate::error::TouchlineResult;
use crate::models::settings::SettingsPatch;
use crate::models::{AppSettings, GameId};
use crate::storage::{ReadMode, StorageKey};

pub struct SettingsService<'a> {
    store: &'a EntityStore,
}

impl<'a> SettingsService<'a> {
    pub fn new(store: &'a EntityStore) -> Self {
        Self { store }
    }

    /// Current settings, defaults if none were saved
    pub async fn get(&self) -> TouchlineResult<AppSettings> {
        self.store
            .load(StorageKey::AppSettings, ReadMode::Lenient)
            .await
    }

    pub async fn update(&self, patch: SettingsPatch) -> TouchlineResult<AppSettings> {
        self.store
            .update(StorageKey::AppSettings, move |settings: &mut AppSettings| {
                settings.apply(patch);
                Ok(settings.clone())
            })
            .await
    }

    pub async fn set_current_game_id(&self, game_id: Option<GameId>) -> TouchlineResult<AppSettings> {
        self.store
            .update(StorageKey::AppSettings, move |settings: &mut AppSettings| {
                settings.current_game_id = game_id;
                Ok(settings.clone())
            })
            .await
    }

    /// Unset the current game if it is `game_id`. Returns whether it was.
    pub(crate) async fn clear_current_game_if(&self, game_id: &str) -> TouchlineResult<bool> {
        // Skip the write entirely in the common case
        let current = self.get().await?.current_game_id;
        if !current.as_ref().is_some_and(|id| id == game_id) {
            return Ok(false);
        }

        let game_id = game_id.to_string();
        self.store
            .update(StorageKey::AppSettings, move |settings: &mut AppSettings| {
                let matches = settings
                    .current_game_id
                    .as_ref()
                    .is_some_and(|id| *id == *game_id);
                if matches {
                    settings.current_game_id = None;
                }
                Ok(matches)
            })
            .await
    }
}
