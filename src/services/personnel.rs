//! Personnel service
//!
//! Removing a staff member also strips their id from every saved game. That
//! cascade holds the personnel lock and the saved-games lock together, taken
//! in [`crate::lock::LOCK_ORDER`].

use super::named::{create_named, find_by_name, modify_named};
use super::store::EntityStore;
use crate::error::{TouchlineError, TouchlineResult};
use crate::models::personnel::PersonnelPatch;
use crate::models::{Collection, Personnel, PersonnelId, PersonnelRole, SavedGame};
use crate::storage::StorageKey;

/// Outcome of removing a staff member
#[derive(Debug, Clone)]
pub struct PersonnelRemoval {
    pub removed: Personnel,
    /// Games whose staff list referenced the removed member
    pub games_updated: usize,
}

pub struct PersonnelService<'a> {
    store: &'a EntityStore,
}

impl<'a> PersonnelService<'a> {
    pub fn new(store: &'a EntityStore) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> TouchlineResult<Vec<Personnel>> {
        let mut personnel = self.store.list::<Personnel>().await?;
        personnel.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(personnel)
    }

    pub async fn list_by_role(&self, role: PersonnelRole) -> TouchlineResult<Vec<Personnel>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|p| p.role == role)
            .collect())
    }

    pub async fn get_by_id(&self, id: &str) -> TouchlineResult<Option<Personnel>> {
        self.store.get::<Personnel>(id).await
    }

    /// Find a staff member by id or name
    pub async fn find(&self, identifier: &str) -> TouchlineResult<Option<Personnel>> {
        if let Some(member) = self.get_by_id(identifier).await? {
            return Ok(Some(member));
        }
        let personnel = self.store.load_collection::<Personnel>().await?;
        Ok(find_by_name(&personnel, identifier).cloned())
    }

    /// Add a staff member. Names must be unique under normalization.
    pub async fn create(&self, name: &str, role: PersonnelRole) -> TouchlineResult<Personnel> {
        create_named(self.store, Personnel::new(name, role)).await
    }

    pub async fn update(&self, id: &str, patch: PersonnelPatch) -> TouchlineResult<Personnel> {
        modify_named(self.store, id, move |member: &mut Personnel| member.apply(patch)).await
    }

    /// Remove a staff member and every game's reference to them
    ///
    /// Both collections are read and changed while both locks are held. The
    /// games are written first, so a failure between the two writes leaves
    /// the member in place with fewer assignments, never a game pointing at
    /// a deleted member.
    pub async fn remove_personnel_member(&self, id: &str) -> TouchlineResult<PersonnelRemoval> {
        let (personnel_guard, games_guard) = self.store.lock_personnel_and_games().await?;

        let mut personnel: Collection<Personnel> = self
            .store
            .read_locked(&personnel_guard, StorageKey::Personnel)
            .await?;
        let removed = personnel
            .remove(id)
            .ok_or_else(|| TouchlineError::personnel_not_found(id))?;

        let mut games: Collection<SavedGame> = self
            .store
            .read_locked(&games_guard, StorageKey::SavedGames)
            .await?;
        let member_id = PersonnelId::from(id);
        let games_updated = games
            .values_mut()
            .map(|game| game.strip_personnel(&member_id))
            .filter(|changed| *changed)
            .count();

        if games_updated > 0 {
            self.store
                .write_locked(&games_guard, StorageKey::SavedGames, &games)
                .await?;
        }
        self.store
            .write_locked(&personnel_guard, StorageKey::Personnel, &personnel)
            .await?;

        // Release in reverse acquisition order
        drop(games_guard);
        drop(personnel_guard);

        tracing::info!(
            personnel = %removed.name,
            games_updated,
            "personnel member removed"
        );
        Ok(PersonnelRemoval {
            removed,
            games_updated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{StoreConfig, TouchlinePaths};
    use crate::services::GameService;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, EntityStore) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TouchlinePaths::with_base_dir(temp_dir.path().to_path_buf());
        let store = EntityStore::open(paths, &StoreConfig::default());
        (temp_dir, store)
    }

    #[tokio::test]
    async fn test_create_and_duplicate() {
        let (_temp_dir, store) = create_test_store();
        let service = PersonnelService::new(&store);

        service.create("Jordan", PersonnelRole::HeadCoach).await.unwrap();
        let err = service
            .create("JORDAN", PersonnelRole::Physio)
            .await
            .unwrap_err();
        assert!(err.is_duplicate_name());

        let coaches = service.list_by_role(PersonnelRole::HeadCoach).await.unwrap();
        assert_eq!(coaches.len(), 1);
    }

    #[tokio::test]
    async fn test_update_rechecks_name() {
        let (_temp_dir, store) = create_test_store();
        let service = PersonnelService::new(&store);

        let jordan = service.create("Jordan", PersonnelRole::HeadCoach).await.unwrap();
        service.create("Alex", PersonnelRole::Physio).await.unwrap();

        let err = service
            .update(
                jordan.id.as_str(),
                PersonnelPatch {
                    name: Some("alex".into()),
                    ..PersonnelPatch::default()
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_duplicate_name());

        let updated = service
            .update(
                jordan.id.as_str(),
                PersonnelPatch {
                    email: Some("jordan@example.com".into()),
                    ..PersonnelPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.email.as_deref(), Some("jordan@example.com"));
    }

    #[tokio::test]
    async fn test_remove_cascades_to_games() {
        let (_temp_dir, store) = create_test_store();
        let service = PersonnelService::new(&store);
        let games = GameService::new(&store);

        let coach = service.create("Jordan", PersonnelRole::HeadCoach).await.unwrap();
        let other = service.create("Alex", PersonnelRole::Physio).await.unwrap();

        for i in 0..5 {
            let mut game = SavedGame::new("Alpha", format!("Opponent {}", i));
            game.personnel_ids = vec![coach.id.clone(), other.id.clone()];
            games.create(game).await.unwrap();
        }
        let untouched = games
            .create(SavedGame::new("Alpha", "Nobody"))
            .await
            .unwrap();

        let removal = service.remove_personnel_member(coach.id.as_str()).await.unwrap();
        assert_eq!(removal.games_updated, 5);
        assert_eq!(removal.removed.id, coach.id);

        for game in games.list().await.unwrap() {
            assert!(!game.personnel_ids.contains(&coach.id));
            if game.id != untouched.id {
                assert_eq!(game.personnel_ids, vec![other.id.clone()]);
            }
        }
        assert!(service.get_by_id(coach.id.as_str()).await.unwrap().is_none());
        assert!(!store.locks().is_locked(StorageKey::Personnel.as_str()));
        assert!(!store.locks().is_locked(StorageKey::SavedGames.as_str()));
    }

    #[tokio::test]
    async fn test_remove_missing_member() {
        let (_temp_dir, store) = create_test_store();
        let service = PersonnelService::new(&store);

        let err = service
            .remove_personnel_member("personnel_0_missing")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(!store.locks().is_locked(StorageKey::Personnel.as_str()));
    }

    #[tokio::test]
    async fn test_cascade_races_with_game_edits() {
        let (_temp_dir, store) = create_test_store();
        let coach = PersonnelService::new(&store)
            .create("Jordan", PersonnelRole::HeadCoach)
            .await
            .unwrap();

        let mut game = SavedGame::new("Alpha", "Beta");
        game.personnel_ids = vec![coach.id.clone()];
        let game = GameService::new(&store).create(game).await.unwrap();

        let removal = {
            let store = store.clone();
            let coach_id = coach.id.to_string();
            tokio::spawn(async move {
                PersonnelService::new(&store)
                    .remove_personnel_member(&coach_id)
                    .await
            })
        };
        let edit = {
            let store = store.clone();
            let game_id = game.id.to_string();
            tokio::spawn(async move {
                GameService::new(&store)
                    .update(
                        &game_id,
                        crate::services::GamePatch {
                            home_score: Some(4),
                            ..Default::default()
                        },
                    )
                    .await
            })
        };

        removal.await.unwrap().unwrap();
        edit.await.unwrap().unwrap();

        let stored = GameService::new(&store)
            .get_by_id(game.id.as_str())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.home_score, 4);
        assert!(stored.personnel_ids.is_empty());
    }
}
