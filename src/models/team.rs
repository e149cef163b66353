//! Team model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::TeamId;
use super::{validate_name, Entity, Named, Validate};
use crate::storage::StorageKey;

/// A team the coach manages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,

    pub name: String,

    /// Display color (e.g. "#1e88e5")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default)]
    pub archived: bool,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// Fields that may be changed on an existing team
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPatch {
    pub name: Option<String>,
    pub color: Option<String>,
    pub archived: Option<bool>,
}

impl Team {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: TeamId::new(),
            name: name.into().trim().to_string(),
            color: None,
            archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: TeamPatch) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(color) = patch.color {
            self.color = Some(color);
        }
        if let Some(archived) = patch.archived {
            self.archived = archived;
        }
        self.updated_at = Utc::now();
    }
}

impl Validate for Team {
    fn validate(&self) -> Result<(), String> {
        validate_name(&self.name)
    }
}

impl Entity for Team {
    const KIND: &'static str = "Team";
    const KEY: StorageKey = StorageKey::Teams;

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl Named for Team {
    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
