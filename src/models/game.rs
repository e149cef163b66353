//! Saved game model
//!
//! A saved game is a full snapshot of one match, including its ordered event
//! log. Event `order` values are always `0..events.len()` in array order; every
//! mutator below re-derives them across the whole list.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{EventId, GameId, PersonnelId, PlayerId, SeasonId, TeamId, TournamentId};
use super::{Entity, Validate};
use crate::storage::StorageKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameEventType {
    Goal,
    OpponentGoal,
    Substitution,
    PeriodEnd,
    GameEnd,
    FairPlayCard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEvent {
    pub id: EventId,

    #[serde(rename = "type")]
    pub event_type: GameEventType,

    /// Seconds since kickoff
    pub time: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scorer_id: Option<PlayerId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assister_id: Option<PlayerId>,

    /// Position in the event list
    #[serde(default)]
    pub order: usize,
}

impl GameEvent {
    pub fn new(event_type: GameEventType, time: u32) -> Self {
        Self {
            id: EventId::new(),
            event_type,
            time,
            scorer_id: None,
            assister_id: None,
            order: 0,
        }
    }

    pub fn goal(time: u32, scorer_id: PlayerId) -> Self {
        Self {
            scorer_id: Some(scorer_id),
            ..Self::new(GameEventType::Goal, time)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum HomeOrAway {
    #[default]
    Home,
    Away,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedGame {
    pub id: GameId,

    pub team_name: String,

    #[serde(default)]
    pub opponent_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_date: Option<NaiveDate>,

    #[serde(default)]
    pub home_or_away: HomeOrAway,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_id: Option<SeasonId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tournament_id: Option<TournamentId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<TeamId>,

    #[serde(default)]
    pub home_score: u32,

    #[serde(default)]
    pub away_score: u32,

    #[serde(default)]
    pub selected_player_ids: Vec<PlayerId>,

    /// Staff present at this game
    #[serde(default)]
    pub personnel_ids: Vec<PersonnelId>,

    #[serde(default)]
    pub events: Vec<GameEvent>,

    #[serde(default)]
    pub is_played: bool,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl SavedGame {
    pub fn new(team_name: impl Into<String>, opponent_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: GameId::new(),
            team_name: team_name.into(),
            opponent_name: opponent_name.into(),
            game_date: None,
            home_or_away: HomeOrAway::default(),
            season_id: None,
            tournament_id: None,
            team_id: None,
            home_score: 0,
            away_score: 0,
            selected_player_ids: Vec::new(),
            personnel_ids: Vec::new(),
            events: Vec::new(),
            is_played: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rewrite every event's `order` to match its array position
    pub fn reindex_events(&mut self) {
        for (index, event) in self.events.iter_mut().enumerate() {
            event.order = index;
        }
    }

    /// Append an event, or insert it at `position` when given
    pub fn add_event(&mut self, event: GameEvent, position: Option<usize>) -> Result<usize, String> {
        let index = position.unwrap_or(self.events.len());
        if index > self.events.len() {
            return Err(format!(
                "event position {} out of range (game has {} events)",
                index,
                self.events.len()
            ));
        }
        self.events.insert(index, event);
        self.reindex_events();
        self.updated_at = Utc::now();
        Ok(index)
    }

    /// Replace the event at `index`, keeping its position
    pub fn update_event(&mut self, index: usize, event: GameEvent) -> Result<(), String> {
        let slot = self
            .events
            .get_mut(index)
            .ok_or_else(|| format!("no event at index {}", index))?;
        *slot = event;
        self.reindex_events();
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn remove_event(&mut self, index: usize) -> Result<GameEvent, String> {
        if index >= self.events.len() {
            return Err(format!("no event at index {}", index));
        }
        let removed = self.events.remove(index);
        self.reindex_events();
        self.updated_at = Utc::now();
        Ok(removed)
    }

    /// Drop a staff member from this game. Returns whether anything changed.
    pub fn strip_personnel(&mut self, personnel_id: &PersonnelId) -> bool {
        let before = self.personnel_ids.len();
        self.personnel_ids.retain(|id| id != personnel_id);
        let changed = self.personnel_ids.len() != before;
        if changed {
            self.updated_at = Utc::now();
        }
        changed
    }

    pub fn has_contiguous_order(&self) -> bool {
        self.events.iter().enumerate().all(|(i, e)| e.order == i)
    }
}

impl Validate for SavedGame {
    fn validate(&self) -> Result<(), String> {
        if self.team_name.trim().is_empty() {
            return Err("team name cannot be empty".into());
        }
        let mut seen = std::collections::HashSet::new();
        for event in &self.events {
            if !seen.insert(event.id.as_str()) {
                return Err(format!("duplicate event id '{}'", event.id));
            }
        }
        if !self.has_contiguous_order() {
            return Err("event order must run 0..n without gaps".into());
        }
        Ok(())
    }
}

impl Entity for SavedGame {
    const KIND: &'static str = "Game";
    const KEY: StorageKey = StorageKey::SavedGames;

    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn normalize(&mut self) {
        self.reindex_events();
    }
}
