//! Team service
//!
//! Team names are unique under normalization ("Alpha" and "ALPHA " collide).

use super::named::{create_named, find_by_name, modify_named};
use super::store::EntityStore;
use crate::error::TouchlineResult;
use crate::models::team::TeamPatch;
use crate::models::Team;

/// Service for team management
pub struct TeamService<'a> {
    store: &'a EntityStore,
}

impl<'a> TeamService<'a> {
    pub fn new(store: &'a EntityStore) -> Self {
        Self { store }
    }

    /// All teams, sorted by name
    pub async fn list(&self) -> TouchlineResult<Vec<Team>> {
        let mut teams = self.store.list::<Team>().await?;
        teams.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(teams)
    }

    /// Teams that are not archived
    pub async fn list_active(&self) -> TouchlineResult<Vec<Team>> {
        Ok(self.list().await?.into_iter().filter(|t| !t.archived).collect())
    }

    pub async fn get_by_id(&self, id: &str) -> TouchlineResult<Option<Team>> {
        self.store.get::<Team>(id).await
    }

    pub async fn get_by_name(&self, name: &str) -> TouchlineResult<Option<Team>> {
        let teams = self.store.load_collection::<Team>().await?;
        Ok(find_by_name(&teams, name).cloned())
    }

    /// Find a team by id or name
    pub async fn find(&self, identifier: &str) -> TouchlineResult<Option<Team>> {
        if let Some(team) = self.get_by_id(identifier).await? {
            return Ok(Some(team));
        }
        self.get_by_name(identifier).await
    }

    pub async fn create(&self, name: &str) -> TouchlineResult<Team> {
        create_named(self.store, Team::new(name)).await
    }

    pub async fn update(&self, id: &str, patch: TeamPatch) -> TouchlineResult<Team> {
        modify_named(self.store, id, move |team: &mut Team| team.apply(patch)).await
    }

    pub async fn rename(&self, id: &str, name: &str) -> TouchlineResult<Team> {
        self.update(
            id,
            TeamPatch {
                name: Some(name.to_string()),
                ..TeamPatch::default()
            },
        )
        .await
    }

    /// Hide from active lists without deleting
    pub async fn archive(&self, id: &str) -> TouchlineResult<Team> {
        self.set_archived(id, true).await
    }

    pub async fn set_archived(&self, id: &str, archived: bool) -> TouchlineResult<Team> {
        self.update(
            id,
            TeamPatch {
                archived: Some(archived),
                ..TeamPatch::default()
            },
        )
        .await
    }

    /// Delete a team. Saved games keep their team name and stale `team_id`.
    pub async fn remove(&self, id: &str) -> TouchlineResult<Team> {
        let removed = self.store.remove::<Team>(id).await?;
        tracing::info!(team = %removed.name, "team removed");
        Ok(removed)
    }
}
