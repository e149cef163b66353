//! Personnel (coaching staff) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::PersonnelId;
use super::{validate_name, Entity, Named, Validate};
use crate::storage::StorageKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum PersonnelRole {
    HeadCoach,
    AssistantCoach,
    GoalkeeperCoach,
    FitnessCoach,
    Physio,
    TeamManager,
    #[default]
    Other,
}

impl PersonnelRole {
    /// Parse a role from user input
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['-', ' '], "_").as_str() {
            "head_coach" | "headcoach" | "head" => Some(Self::HeadCoach),
            "assistant_coach" | "assistantcoach" | "assistant" => Some(Self::AssistantCoach),
            "goalkeeper_coach" | "goalkeepercoach" | "goalkeeper" | "gk" => {
                Some(Self::GoalkeeperCoach)
            }
            "fitness_coach" | "fitnesscoach" | "fitness" => Some(Self::FitnessCoach),
            "physio" => Some(Self::Physio),
            "team_manager" | "teammanager" | "manager" => Some(Self::TeamManager),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for PersonnelRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::HeadCoach => "Head coach",
            Self::AssistantCoach => "Assistant coach",
            Self::GoalkeeperCoach => "Goalkeeper coach",
            Self::FitnessCoach => "Fitness coach",
            Self::Physio => "Physio",
            Self::TeamManager => "Team manager",
            Self::Other => "Other",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Personnel {
    pub id: PersonnelId,

    pub name: String,

    #[serde(default)]
    pub role: PersonnelRole,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonnelPatch {
    pub name: Option<String>,
    pub role: Option<PersonnelRole>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl Personnel {
    pub fn new(name: impl Into<String>, role: PersonnelRole) -> Self {
        let now = Utc::now();
        Self {
            id: PersonnelId::new(),
            name: name.into().trim().to_string(),
            role,
            phone: None,
            email: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: PersonnelPatch) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if patch.phone.is_some() {
            self.phone = patch.phone;
        }
        if patch.email.is_some() {
            self.email = patch.email;
        }
        self.updated_at = Utc::now();
    }
}

impl Validate for Personnel {
    fn validate(&self) -> Result<(), String> {
        validate_name(&self.name)?;
        if let Some(email) = &self.email {
            if !email.contains('@') {
                return Err(format!("invalid email '{}'", email));
            }
        }
        Ok(())
    }
}

impl Entity for Personnel {
    const KIND: &'static str = "Personnel";
    const KEY: StorageKey = StorageKey::Personnel;

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl Named for Personnel {
    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        let mut coach = Personnel::new("Jordan", PersonnelRole::HeadCoach);
        assert!(coach.validate().is_ok());

        coach.email = Some("not-an-email".into());
        assert!(coach.validate().is_err());

        coach.email = Some("jordan@example.com".into());
        assert!(coach.validate().is_ok());
    }

    #[test]
    fn test_role_wire_format() {
        let json = serde_json::to_string(&PersonnelRole::GoalkeeperCoach).unwrap();
        assert_eq!(json, r#""goalkeeperCoach""#);
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(PersonnelRole::parse("Head coach"), Some(PersonnelRole::HeadCoach));
        assert_eq!(PersonnelRole::parse("gk"), Some(PersonnelRole::GoalkeeperCoach));
        assert_eq!(PersonnelRole::parse("team-manager"), Some(PersonnelRole::TeamManager));
        assert_eq!(PersonnelRole::parse("referee"), None);
    }
}
