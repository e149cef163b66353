//! Season service

use super::named::{create_named, find_by_name, modify_named};
use super::store::EntityStore;
use crate::error::TouchlineResult;
use crate::models::season::CompetitionPatch;
use crate::models::Season;

/// Service for season management
pub struct SeasonService<'a> {
    store: &'a EntityStore,
}

impl<'a> SeasonService<'a> {
    pub fn new(store: &'a EntityStore) -> Self {
        Self { store }
    }

    /// All seasons, most recent start date first
    pub async fn list(&self) -> TouchlineResult<Vec<Season>> {
        let mut seasons = self.store.list::<Season>().await?;
        seasons.sort_by(|a, b| {
            b.start_date
                .cmp(&a.start_date)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(seasons)
    }

    pub async fn get_by_id(&self, id: &str) -> TouchlineResult<Option<Season>> {
        self.store.get::<Season>(id).await
    }

    pub async fn get_by_name(&self, name: &str) -> TouchlineResult<Option<Season>> {
        let seasons = self.store.load_collection::<Season>().await?;
        Ok(find_by_name(&seasons, name).cloned())
    }

    pub async fn create(&self, name: &str) -> TouchlineResult<Season> {
        create_named(self.store, Season::new(name)).await
    }

    /// Create a season with its details filled in
    pub async fn create_with(&self, name: &str, details: CompetitionPatch) -> TouchlineResult<Season> {
        let mut season = Season::new(name);
        season.apply(CompetitionPatch { name: None, ..details });
        create_named(self.store, season).await
    }

    pub async fn update(&self, id: &str, patch: CompetitionPatch) -> TouchlineResult<Season> {
        modify_named(self.store, id, move |season: &mut Season| season.apply(patch)).await
    }

    /// Hide from active lists without deleting
    pub async fn archive(&self, id: &str) -> TouchlineResult<Season> {
        self.set_archived(id, true).await
    }

    pub async fn set_archived(&self, id: &str, archived: bool) -> TouchlineResult<Season> {
        self.update(
            id,
            CompetitionPatch {
                archived: Some(archived),
                ..CompetitionPatch::default()
            },
        )
        .await
    }

    /// Delete a season. Games filed under it keep the stale `season_id`.
    pub async fn remove(&self, id: &str) -> TouchlineResult<Season> {
        self.store.remove::<Season>(id).await
    }
}
