//! Tournament service

use super::named::{create_named, find_by_name, modify_named};
use super::store::EntityStore;
use crate::error::TouchlineResult;
use crate::models::season::CompetitionPatch;
use crate::models::Tournament;

/// Service for tournament management
pub struct TournamentService<'a> {
    store: &'a EntityStore,
}

impl<'a> TournamentService<'a> {
    pub fn new(store: &'a EntityStore) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> TouchlineResult<Vec<Tournament>> {
        let mut tournaments = self.store.list::<Tournament>().await?;
        tournaments.sort_by(|a, b| {
            b.start_date
                .cmp(&a.start_date)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(tournaments)
    }

    pub async fn get_by_id(&self, id: &str) -> TouchlineResult<Option<Tournament>> {
        self.store.get::<Tournament>(id).await
    }

    pub async fn get_by_name(&self, name: &str) -> TouchlineResult<Option<Tournament>> {
        let tournaments = self.store.load_collection::<Tournament>().await?;
        Ok(find_by_name(&tournaments, name).cloned())
    }

    pub async fn create(&self, name: &str, level: Option<&str>) -> TouchlineResult<Tournament> {
        let mut tournament = Tournament::new(name);
        tournament.level = level.map(|l| l.trim().to_string()).filter(|l| !l.is_empty());
        create_named(self.store, tournament).await
    }

    pub async fn update(&self, id: &str, patch: CompetitionPatch) -> TouchlineResult<Tournament> {
        modify_named(self.store, id, move |t: &mut Tournament| t.apply(patch)).await
    }

    pub async fn set_level(&self, id: &str, level: Option<String>) -> TouchlineResult<Tournament> {
        modify_named(self.store, id, move |t: &mut Tournament| {
            t.level = level;
            t.updated_at = chrono::Utc::now();
        })
        .await
    }

    /// Hide from active lists without deleting
    pub async fn archive(&self, id: &str) -> TouchlineResult<Tournament> {
        self.set_archived(id, true).await
    }

    pub async fn set_archived(&self, id: &str, archived: bool) -> TouchlineResult<Tournament> {
        self.update(
            id,
            CompetitionPatch {
                archived: Some(archived),
                ..CompetitionPatch::default()
            },
        )
        .await
    }

    pub async fn remove(&self, id: &str) -> TouchlineResult<Tournament> {
        self.store.remove::<Tournament>(id).await
    }
}
