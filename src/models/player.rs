//! Roster player model

use serde::{Deserialize, Serialize};

use super::ids::PlayerId;
use super::{validate_name, Entity, Validate};
use crate::storage::StorageKey;

/// An entry in the master roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,

    /// Kept as text: "07" and "7" are different shirts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jersey_number: Option<String>,

    #[serde(default)]
    pub is_goalie: bool,

    #[serde(default)]
    pub received_fair_play_card: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPatch {
    pub name: Option<String>,
    pub nickname: Option<String>,
    pub jersey_number: Option<String>,
    pub is_goalie: Option<bool>,
    pub received_fair_play_card: Option<bool>,
    pub notes: Option<String>,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PlayerId::new(),
            name: name.into().trim().to_string(),
            nickname: None,
            jersey_number: None,
            is_goalie: false,
            received_fair_play_card: false,
            notes: None,
        }
    }

    pub fn apply(&mut self, patch: PlayerPatch) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if patch.nickname.is_some() {
            self.nickname = patch.nickname;
        }
        if patch.jersey_number.is_some() {
            self.jersey_number = patch.jersey_number;
        }
        if let Some(is_goalie) = patch.is_goalie {
            self.is_goalie = is_goalie;
        }
        if let Some(card) = patch.received_fair_play_card {
            self.received_fair_play_card = card;
        }
        if patch.notes.is_some() {
            self.notes = patch.notes;
        }
    }
}

impl Validate for Player {
    fn validate(&self) -> Result<(), String> {
        validate_name(&self.name)?;
        if let Some(number) = &self.jersey_number {
            if number.len() > 3 || !number.chars().all(|c| c.is_ascii_digit()) {
                return Err(format!("invalid jersey number '{}'", number));
            }
        }
        Ok(())
    }
}

impl Entity for Player {
    const KIND: &'static str = "Player";
    const KEY: StorageKey = StorageKey::MasterRoster;

    fn id(&self) -> &str {
        self.id.as_str()
    }
}
