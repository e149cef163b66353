//! Player statistic adjustment service

use serde::{Deserialize, Serialize};

use super::store::EntityStore;
use crate::error::{TouchlineError, TouchlineResult};
use crate::models::{PlayerStatAdjustment, Validate};

/// Deltas that may be corrected on an existing adjustment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentPatch {
    pub games_played_delta: Option<i32>,
    pub goals_delta: Option<i32>,
    pub assists_delta: Option<i32>,
    pub note: Option<String>,
}

/// Summed deltas for one player
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdjustmentTotals {
    pub games_played: i32,
    pub goals: i32,
    pub assists: i32,
}

pub struct AdjustmentService<'a> {
    store: &'a EntityStore,
}

impl<'a> AdjustmentService<'a> {
    pub fn new(store: &'a EntityStore) -> Self {
        Self { store }
    }

    /// All adjustments, oldest first
    pub async fn list(&self) -> TouchlineResult<Vec<PlayerStatAdjustment>> {
        let mut adjustments = self.store.list::<PlayerStatAdjustment>().await?;
        adjustments.sort_by_key(|a| a.applied_at);
        Ok(adjustments)
    }

    pub async fn list_for_player(&self, player_id: &str) -> TouchlineResult<Vec<PlayerStatAdjustment>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|a| a.player_id == *player_id)
            .collect())
    }

    pub async fn totals_for_player(&self, player_id: &str) -> TouchlineResult<AdjustmentTotals> {
        let totals = self
            .list_for_player(player_id)
            .await?
            .iter()
            .fold(AdjustmentTotals::default(), |acc, a| AdjustmentTotals {
                games_played: acc.games_played + a.games_played_delta,
                goals: acc.goals + a.goals_delta,
                assists: acc.assists + a.assists_delta,
            });
        Ok(totals)
    }

    pub async fn create(&self, adjustment: PlayerStatAdjustment) -> TouchlineResult<PlayerStatAdjustment> {
        adjustment
            .validate()
            .map_err(TouchlineError::ValidationFailed)?;

        self.store
            .update_collection::<PlayerStatAdjustment, _, _>(move |adjustments| {
                adjustments.insert(adjustment.id.to_string(), adjustment.clone());
                Ok(adjustment)
            })
            .await
    }

    pub async fn update(&self, id: &str, patch: AdjustmentPatch) -> TouchlineResult<PlayerStatAdjustment> {
        self.store
            .modify::<PlayerStatAdjustment, _>(id, move |adjustment| {
                if let Some(delta) = patch.games_played_delta {
                    adjustment.games_played_delta = delta;
                }
                if let Some(delta) = patch.goals_delta {
                    adjustment.goals_delta = delta;
                }
                if let Some(delta) = patch.assists_delta {
                    adjustment.assists_delta = delta;
                }
                if patch.note.is_some() {
                    adjustment.note = patch.note;
                }
                Ok(())
            })
            .await
    }

    pub async fn remove(&self, id: &str) -> TouchlineResult<PlayerStatAdjustment> {
        self.store.remove::<PlayerStatAdjustment>(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{StoreConfig, TouchlinePaths};
    use crate::models::PlayerId;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, EntityStore) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TouchlinePaths::with_base_dir(temp_dir.path().to_path_buf());
        let store = EntityStore::open(paths, &StoreConfig::default());
        (temp_dir, store)
    }

    fn adjustment(player: &str, goals: i32, assists: i32) -> PlayerStatAdjustment {
        let mut adjustment = PlayerStatAdjustment::new(PlayerId::from(player));
        adjustment.games_played_delta = 1;
        adjustment.goals_delta = goals;
        adjustment.assists_delta = assists;
        adjustment
    }

    #[tokio::test]
    async fn test_totals_for_player() {
        let (_temp_dir, store) = create_test_store();
        let service = AdjustmentService::new(&store);

        service.create(adjustment("player_1", 2, 1)).await.unwrap();
        service.create(adjustment("player_1", 1, 0)).await.unwrap();
        service.create(adjustment("player_2", 5, 5)).await.unwrap();

        assert_eq!(service.list_for_player("player_1").await.unwrap().len(), 2);
        assert_eq!(
            service.totals_for_player("player_1").await.unwrap(),
            AdjustmentTotals {
                games_played: 2,
                goals: 3,
                assists: 1
            }
        );
    }

    #[tokio::test]
    async fn test_update_cannot_zero_out() {
        let (_temp_dir, store) = create_test_store();
        let service = AdjustmentService::new(&store);

        let created = service.create(adjustment("player_1", 2, 0)).await.unwrap();
        let err = service
            .update(
                created.id.as_str(),
                AdjustmentPatch {
                    games_played_delta: Some(0),
                    goals_delta: Some(0),
                    ..AdjustmentPatch::default()
                },
            )
            .await
            .unwrap_err();

        assert!(err.is_validation());
        assert_eq!(service.list().await.unwrap()[0].goals_delta, 2);
    }

    #[tokio::test]
    async fn test_remove() {
        let (_temp_dir, store) = create_test_store();
        let service = AdjustmentService::new(&store);

        let created = service.create(adjustment("player_1", 1, 0)).await.unwrap();
        service.remove(created.id.as_str()).await.unwrap();
        assert!(service.list().await.unwrap().is_empty());
    }
}
