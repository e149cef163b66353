//! Tournament model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ids::TournamentId;
use super::season::{validate_date_range, CompetitionPatch};
use super::{validate_name, Entity, Named, Validate};
use crate::storage::StorageKey;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: TournamentId,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Competition level, e.g. "U12 Regional"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,

    #[serde(default)]
    pub archived: bool,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Tournament {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: TournamentId::new(),
            name: name.into().trim().to_string(),
            location: None,
            level: None,
            start_date: None,
            end_date: None,
            archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: CompetitionPatch) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if patch.location.is_some() {
            self.location = patch.location;
        }
        if patch.start_date.is_some() {
            self.start_date = patch.start_date;
        }
        if patch.end_date.is_some() {
            self.end_date = patch.end_date;
        }
        if let Some(archived) = patch.archived {
            self.archived = archived;
        }
        self.updated_at = Utc::now();
    }
}

impl Validate for Tournament {
    fn validate(&self) -> Result<(), String> {
        validate_name(&self.name)?;
        validate_date_range(self.start_date, self.end_date)
    }
}

impl Entity for Tournament {
    const KIND: &'static str = "Tournament";
    const KEY: StorageKey = StorageKey::Tournaments;

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl Named for Tournament {
    fn name(&self) -> &str {
        &self.name
    }
}
