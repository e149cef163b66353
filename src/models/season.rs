//! Season model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ids::SeasonId;
use super::{validate_name, Entity, Named, Validate};
use crate::storage::StorageKey;

/// A league season games can be filed under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Season {
    pub id: SeasonId,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

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

/// Fields that may be changed on a season or tournament
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionPatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub archived: Option<bool>,
}

impl Season {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: SeasonId::new(),
            name: name.into().trim().to_string(),
            location: None,
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

/// End date, when both are set, may not precede the start date
pub(crate) fn validate_date_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), String> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => {
            Err(format!("end date {} is before start date {}", end, start))
        }
        _ => Ok(()),
    }
}

impl Validate for Season {
    fn validate(&self) -> Result<(), String> {
        validate_name(&self.name)?;
        validate_date_range(self.start_date, self.end_date)
    }
}

impl Entity for Season {
    const KIND: &'static str = "Season";
    const KEY: StorageKey = StorageKey::Seasons;

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl Named for Season {
    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_range_validation() {
        let mut season = Season::new("Spring 2026");
        season.start_date = NaiveDate::from_ymd_opt(2026, 3, 1);
        season.end_date = NaiveDate::from_ymd_opt(2026, 6, 30);
        assert!(season.validate().is_ok());

        season.end_date = NaiveDate::from_ymd_opt(2026, 2, 1);
        assert!(season.validate().is_err());
    }

    #[test]
    fn test_patch_keeps_unset_fields() {
        let mut season = Season::new("Spring");
        season.location = Some("North Field".into());
        season.apply(CompetitionPatch {
            name: Some("Spring 2026".into()),
            ..CompetitionPatch::default()
        });

        assert_eq!(season.name, "Spring 2026");
        assert_eq!(season.location.as_deref(), Some("North Field"));
    }
}
