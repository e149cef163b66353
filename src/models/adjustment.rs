//! Manual player statistic adjustments
//!
//! Coaches record games played outside the app (or corrections) as deltas
//! that are added on top of the stats derived from saved games.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{AdjustmentId, PlayerId, SeasonId, TournamentId};
use super::{Entity, Validate};
use crate::storage::StorageKey;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatAdjustment {
    pub id: AdjustmentId,

    pub player_id: PlayerId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_id: Option<SeasonId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tournament_id: Option<TournamentId>,

    #[serde(default)]
    pub games_played_delta: i32,

    #[serde(default)]
    pub goals_delta: i32,

    #[serde(default)]
    pub assists_delta: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    #[serde(default = "Utc::now")]
    pub applied_at: DateTime<Utc>,
}

impl PlayerStatAdjustment {
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            id: AdjustmentId::new(),
            player_id,
            season_id: None,
            tournament_id: None,
            games_played_delta: 0,
            goals_delta: 0,
            assists_delta: 0,
            note: None,
            applied_at: Utc::now(),
        }
    }
}

impl Validate for PlayerStatAdjustment {
    fn validate(&self) -> Result<(), String> {
        if self.player_id.as_str().trim().is_empty() {
            return Err("adjustment must reference a player".into());
        }
        if self.games_played_delta == 0 && self.goals_delta == 0 && self.assists_delta == 0 {
            return Err("adjustment changes nothing".into());
        }
        Ok(())
    }
}

impl Entity for PlayerStatAdjustment {
    const KIND: &'static str = "Adjustment";
    const KEY: StorageKey = StorageKey::PlayerAdjustments;

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_adjustment_is_invalid() {
        let mut adjustment = PlayerStatAdjustment::new(PlayerId::from("p1"));
        assert!(adjustment.validate().is_err());

        adjustment.goals_delta = 2;
        assert!(adjustment.validate().is_ok());
    }
}
